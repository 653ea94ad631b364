//! Translation-unit driver: every available interface definition of one framework.
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::config::ExtractOptions;
use crate::decl::InterfaceDecl;
use crate::error::SnapshotError;
use crate::extract::Extractor;
use crate::oracle::{AstCursor, ChildVisit, CursorKind};
use crate::snapshot::AstSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub platform: String,
    /// In order of first appearance.
    pub interfaces: Vec<InterfaceDecl>,
}

impl FrameworkMetadata {
    pub fn empty(options: &ExtractOptions) -> Self {
        FrameworkMetadata {
            framework: options.framework.clone(),
            platform: options.platform.clone(),
            interfaces: Vec::new(),
        }
    }

    /// Concatenate per-input results; the first definition of a name wins.
    pub fn merge<I>(parts: I, options: &ExtractOptions) -> Self
    where
        I: IntoIterator<Item = FrameworkMetadata>,
    {
        let mut interfaces = IndexMap::new();
        for decl in parts.into_iter().flat_map(|part| part.interfaces) {
            insert_first(&mut interfaces, decl);
        }
        FrameworkMetadata { interfaces: interfaces.into_values().collect(), ..Self::empty(options) }
    }
}

pub fn extract_framework<C: AstCursor>(root: &C, options: &ExtractOptions) -> FrameworkMetadata {
    let extractor = Extractor::new(options.policy());
    let marker = options.framework_marker();

    let mut interfaces: IndexMap<String, InterfaceDecl> = IndexMap::new();
    let mut outside = 0usize;
    let mut filtered = 0usize;

    root.visit_children(|cursor| {
        if cursor.kind() != CursorKind::ObjCInterfaceDecl {
            return ChildVisit::Continue;
        }
        if !cursor.is_definition() {
            trace!(name = %cursor.spelling(), "skipping forward declaration");
            return ChildVisit::Continue;
        }
        if let Some(marker) = &marker {
            if !cursor.file_name().is_some_and(|file| file.contains(marker.as_str())) {
                outside += 1;
                return ChildVisit::Continue;
            }
        }
        match extractor.interface(&cursor) {
            Some(decl) => insert_first(&mut interfaces, decl),
            None => filtered += 1,
        }
        ChildVisit::Continue
    });

    info!(
        framework = ?options.framework,
        platform = %options.platform,
        interfaces = interfaces.len(),
        outside,
        filtered,
        "extracted framework metadata"
    );

    FrameworkMetadata { interfaces: interfaces.into_values().collect(), ..FrameworkMetadata::empty(options) }
}

/// [`extract_framework`] from a snapshot's translation-unit cursor.
///
/// The snapshot is validated first, so one assembled through the builder
/// methods with a dangling id is an error instead of a panic.
pub fn extract_snapshot(snapshot: &AstSnapshot, options: &ExtractOptions) -> Result<FrameworkMetadata, SnapshotError> {
    snapshot.validate()?;
    Ok(match snapshot.root() {
        Some(root) => extract_framework(&root, options),
        None => FrameworkMetadata::empty(options),
    })
}

fn insert_first(interfaces: &mut IndexMap<String, InterfaceDecl>, decl: InterfaceDecl) {
    match interfaces.entry(decl.name.clone()) {
        Entry::Occupied(kept) => {
            warn!(interface = %decl.name, kept = %kept.get().file, dropped = %decl.file, "duplicate interface definition");
        }
        Entry::Vacant(slot) => {
            slot.insert(decl);
        }
    }
}
