//! Declaration extraction for `@interface` cursors.
//!
//! Every declaration goes through the availability gate first. A declaration
//! that fails it contributes nothing, not even a partial record, and for an
//! interface that includes all of its members. Members are gated on their own,
//! so a method can drop out of an interface that passed.
pub mod method;
pub mod property;

use tracing::{debug, trace, warn};

use crate::availability::{Availability, AvailabilityEntry, AvailabilityPolicy};
use crate::decl::{ClassRef, InterfaceDecl};
use crate::oracle::{AstCursor, ChildVisit, CursorKind};

const INTERFACE_INTRODUCER: &str = "@interface";

pub struct Extractor {
    policy: AvailabilityPolicy,
}

impl Extractor {
    pub fn new(policy: AvailabilityPolicy) -> Self {
        Self { policy }
    }

    /// Availability entries to record, or `None` when the declaration is filtered.
    pub fn gate<C: AstCursor>(&self, cursor: &C) -> Option<Vec<AvailabilityEntry>> {
        match self.policy.check(cursor.platform_availability()) {
            Availability::Available(entries) => Some(entries),
            Availability::Unavailable(reason) => {
                trace!(kind = ?cursor.kind(), name = %cursor.spelling(), %reason, "skipping declaration");
                None
            }
        }
    }

    pub fn interface<C: AstCursor>(&self, cursor: &C) -> Option<InterfaceDecl> {
        let availability = self.gate(cursor)?;

        let mut decl = InterfaceDecl {
            name: cursor.spelling(),
            file: cursor.file_name().unwrap_or_default(),
            superclass: None,
            protocols: Vec::new(),
            properties: Vec::new(),
            instance_methods: Vec::new(),
            class_methods: Vec::new(),
            availability,
            type_string: interface_header(&cursor.pretty_printed()),
        };

        cursor.visit_children(|child| {
            match child.kind() {
                CursorKind::ObjCSuperClassRef => {
                    let next = class_ref(&child);
                    if let Some(previous) = decl.superclass.replace(next) {
                        // last one wins
                        warn!(interface = %decl.name, dropped = %previous.name, "multiple superclass references");
                    }
                }
                CursorKind::ObjCProtocolRef => decl.protocols.push(child.spelling()),
                CursorKind::ObjCPropertyDecl => {
                    if let Some(property) = self.property(&child) {
                        decl.properties.push(property);
                    }
                }
                CursorKind::ObjCInstanceMethodDecl => {
                    if let Some(method) = self.method(&child) {
                        decl.instance_methods.push(method);
                    }
                }
                CursorKind::ObjCClassMethodDecl => {
                    if let Some(method) = self.method(&child) {
                        decl.class_methods.push(method);
                    }
                }
                _ => {}
            }
            ChildVisit::Continue
        });

        debug!(
            interface = %decl.name,
            properties = decl.properties.len(),
            instance_methods = decl.instance_methods.len(),
            class_methods = decl.class_methods.len(),
            "extracted interface"
        );
        Some(decl)
    }
}

fn class_ref<C: AstCursor>(reference: &C) -> ClassRef {
    let module = reference
        .referenced()
        .and_then(|class| class.file_name())
        .or_else(|| reference.file_name())
        .unwrap_or_default();
    ClassRef { name: reference.spelling(), module }
}

/// `@interface Foo : Bar <Baz>` out of the full pretty-printed declaration.
pub fn interface_header(pretty: &str) -> String {
    let from = pretty.find(INTERFACE_INTRODUCER).unwrap_or(0);
    let rest = &pretty[from..];
    let end = rest.find(['\n', '{']).unwrap_or(rest.len());
    rest[..end].trim().to_string()
}
