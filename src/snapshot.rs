//! Serialized AST: an arena of cursor and type nodes dumped from a libclang
//! session, answering the [`crate::oracle`] queries without libclang at hand.
//!
//! Nodes reference each other by index. [`AstSnapshot::from_json`] checks every
//! reference and rejects cyclic child or type-composition graphs, so walking a
//! loaded snapshot always terminates.
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::availability::PlatformAvailability;
use crate::error::SnapshotError;
use crate::oracle::{AstCursor, AstType, ChildVisit, CursorKind, NullabilityKind, PropertyAttributes};

// --------------------------------- Ids ----------------------------------- //

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

// -------------------------------- Nodes ---------------------------------- //

const LAYOUT_UNKNOWN: i64 = -1;

fn layout_unknown() -> i64 { LAYOUT_UNKNOWN }
fn yes() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorNode {
    pub kind: CursorKind,
    #[serde(default)]
    pub spelling: String,
    /// Falls back to `spelling`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_printed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default = "yes")]
    pub is_definition: bool,
    #[serde(default)]
    pub children: Vec<CursorId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_type: Option<TypeId>,
    #[serde(default)]
    pub arguments: Vec<CursorId>,
    /// Reported argument count when it differs from `arguments.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_arguments: Option<i32>,
    #[serde(default)]
    pub property_attributes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<String>,
    #[serde(default)]
    pub availability: PlatformAvailability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced: Option<CursorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<CursorId>,
}

impl CursorNode {
    pub fn new(kind: CursorKind, spelling: impl Into<String>) -> Self {
        CursorNode {
            kind,
            spelling: spelling.into(),
            pretty_printed: None,
            file: None,
            is_definition: true,
            children: Vec::new(),
            ty: None,
            result_type: None,
            arguments: Vec::new(),
            num_arguments: None,
            property_attributes: 0,
            getter: None,
            setter: None,
            availability: PlatformAvailability::default(),
            referenced: None,
            definition: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeNode {
    pub spelling: String,
    pub kind: String,
    /// `None` means the type is its own canonical form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<TypeId>,
    #[serde(default)]
    pub nullability: NullabilityKind,
    #[serde(default = "layout_unknown")]
    pub size: i64,
    #[serde(default = "layout_unknown")]
    pub align: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<TypeId>,
    #[serde(default = "layout_unknown")]
    pub array_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointee: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TypeId>,
    /// `None` for non-function types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<TypeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<CursorId>,
}

impl TypeNode {
    pub fn new(spelling: impl Into<String>, kind: impl Into<String>) -> Self {
        TypeNode {
            spelling: spelling.into(),
            kind: kind.into(),
            canonical: None,
            nullability: NullabilityKind::Invalid,
            size: LAYOUT_UNKNOWN,
            align: LAYOUT_UNKNOWN,
            element: None,
            array_size: LAYOUT_UNKNOWN,
            pointee: None,
            result: None,
            arguments: None,
            declaration: None,
        }
    }

    pub fn builtin(spelling: impl Into<String>, kind: impl Into<String>, size: i64) -> Self {
        TypeNode { size, align: size, ..TypeNode::new(spelling, kind) }
    }

    /// Data pointer on a 64-bit target.
    pub fn pointer(spelling: impl Into<String>, pointee: TypeId) -> Self {
        TypeNode { pointee: Some(pointee), size: 8, align: 8, ..TypeNode::new(spelling, "Pointer") }
    }

    pub fn block(spelling: impl Into<String>, signature: TypeId) -> Self {
        TypeNode { pointee: Some(signature), size: 8, align: 8, ..TypeNode::new(spelling, "BlockPointer") }
    }
}

// ------------------------------- Snapshot -------------------------------- //

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstSnapshot {
    /// Translation-unit cursor.
    #[serde(default)]
    pub root: CursorId,
    #[serde(default)]
    pub cursors: Vec<CursorNode>,
    #[serde(default)]
    pub types: Vec<TypeNode>,
}

impl AstSnapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let src = fs::read_to_string(path)
            .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&src)
    }

    pub fn from_json(src: &str) -> Result<Self, SnapshotError> {
        let snapshot: AstSnapshot = crate::path_de::from_str_with_path(src)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn push_cursor(&mut self, node: CursorNode) -> CursorId {
        self.cursors.push(node);
        CursorId(self.cursors.len() as u32 - 1)
    }

    pub fn push_type(&mut self, node: TypeNode) -> TypeId {
        self.types.push(node);
        TypeId(self.types.len() as u32 - 1)
    }

    pub fn add_child(&mut self, parent: CursorId, child: CursorId) {
        self.cursor_node_mut(parent).children.push(child);
    }

    pub fn cursor_node_mut(&mut self, id: CursorId) -> &mut CursorNode {
        &mut self.cursors[id.0 as usize]
    }

    /// Handle for `id`, which must come from this snapshot.
    pub fn cursor(&self, id: CursorId) -> SnapshotCursor<'_> {
        SnapshotCursor { snap: self, id }
    }

    pub fn ty(&self, id: TypeId) -> SnapshotType<'_> {
        SnapshotType { snap: self, id }
    }

    pub fn root(&self) -> Option<SnapshotCursor<'_>> {
        self.has_cursor(self.root).then(|| self.cursor(self.root))
    }

    fn has_cursor(&self, id: CursorId) -> bool {
        (id.0 as usize) < self.cursors.len()
    }

    fn has_type(&self, id: TypeId) -> bool {
        (id.0 as usize) < self.types.len()
    }

    // ------------------------------ Validate ------------------------------ //

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.has_cursor(self.root) {
            return Err(SnapshotError::MissingRoot(self.root));
        }

        for (i, node) in self.cursors.iter().enumerate() {
            let from = || format!("cursor #{i}");
            let cursor_refs = node.children.iter().map(|c| ("children", *c))
                .chain(node.arguments.iter().map(|c| ("arguments", *c)))
                .chain(node.referenced.map(|c| ("referenced", c)))
                .chain(node.definition.map(|c| ("definition", c)));
            for (field, target) in cursor_refs {
                if !self.has_cursor(target) {
                    return Err(SnapshotError::DanglingCursor { from: from(), field, target });
                }
            }
            let type_refs = node.ty.map(|t| ("type", t)).into_iter()
                .chain(node.result_type.map(|t| ("resultType", t)));
            for (field, target) in type_refs {
                if !self.has_type(target) {
                    return Err(SnapshotError::DanglingType { from: from(), field, target });
                }
            }
        }

        for (i, node) in self.types.iter().enumerate() {
            let from = || format!("type #{i}");
            let type_refs = node.canonical.map(|t| ("canonical", t)).into_iter()
                .chain(composition(node).map(|t| ("composition", t)));
            for (field, target) in type_refs {
                if !self.has_type(target) {
                    return Err(SnapshotError::DanglingType { from: from(), field, target });
                }
            }
            if let Some(target) = node.declaration.filter(|c| !self.has_cursor(*c)) {
                return Err(SnapshotError::DanglingCursor { from: from(), field: "declaration", target });
            }
        }

        if let Some(at) = find_cycle(self.cursors.len(), |i| {
            self.cursors[i].children.iter().map(|c| c.0 as usize).collect()
        }) {
            return Err(SnapshotError::ChildCycle(CursorId(at as u32)));
        }
        if let Some(at) = find_cycle(self.types.len(), |i| {
            composition(&self.types[i]).map(|t| t.0 as usize).collect()
        }) {
            return Err(SnapshotError::TypeCycle(TypeId(at as u32)));
        }
        Ok(())
    }
}

// Edges the type resolver recurses along.
fn composition(node: &TypeNode) -> impl Iterator<Item = TypeId> + '_ {
    node.element.into_iter()
        .chain(node.pointee)
        .chain(node.result)
        .chain(node.arguments.iter().flatten().copied())
}

/// Depth-first search for a back edge; returns a node on the cycle.
fn find_cycle<F>(len: usize, successors: F) -> Option<usize>
where
    F: Fn(usize) -> Vec<usize>,
{
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark { Unseen, Open, Closed }

    let mut marks = vec![Mark::Unseen; len];
    for start in 0..len {
        if marks[start] != Mark::Unseen {
            continue;
        }
        marks[start] = Mark::Open;
        let mut stack = vec![(start, successors(start), 0usize)];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next = top.1.get(top.2).copied();
            top.2 += 1;
            match next {
                None => {
                    marks[node] = Mark::Closed;
                    stack.pop();
                }
                Some(succ) => match marks[succ] {
                    Mark::Open => return Some(succ),
                    Mark::Closed => {}
                    Mark::Unseen => {
                        marks[succ] = Mark::Open;
                        stack.push((succ, successors(succ), 0));
                    }
                },
            }
        }
    }
    None
}

// ------------------------------- Handles --------------------------------- //

#[derive(Clone, Copy)]
pub struct SnapshotCursor<'a> {
    snap: &'a AstSnapshot,
    id: CursorId,
}

#[derive(Clone, Copy)]
pub struct SnapshotType<'a> {
    snap: &'a AstSnapshot,
    id: TypeId,
}

impl fmt::Debug for SnapshotCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCursor")
            .field("id", &self.id)
            .field("kind", &self.node().kind)
            .field("spelling", &self.node().spelling)
            .finish()
    }
}

impl fmt::Debug for SnapshotType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotType")
            .field("id", &self.id)
            .field("spelling", &self.node().spelling)
            .finish()
    }
}

impl<'a> SnapshotCursor<'a> {
    pub fn id(&self) -> CursorId { self.id }

    fn node(&self) -> &'a CursorNode {
        &self.snap.cursors[self.id.0 as usize]
    }

    fn wrap(&self, id: CursorId) -> Self {
        SnapshotCursor { snap: self.snap, id }
    }

    // false once a visitor asked to break
    fn walk(&self, visitor: &mut dyn FnMut(SnapshotCursor<'a>) -> ChildVisit) -> bool {
        for &id in &self.node().children {
            let child = self.wrap(id);
            match visitor(child) {
                ChildVisit::Break => return false,
                ChildVisit::Continue => {}
                ChildVisit::Recurse => {
                    if !child.walk(visitor) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl<'a> SnapshotType<'a> {
    pub fn id(&self) -> TypeId { self.id }

    fn node(&self) -> &'a TypeNode {
        &self.snap.types[self.id.0 as usize]
    }

    fn wrap(&self, id: TypeId) -> Self {
        SnapshotType { snap: self.snap, id }
    }
}

fn default_setter(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("set{}{}:", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

impl<'a> AstCursor for SnapshotCursor<'a> {
    type Type = SnapshotType<'a>;

    fn kind(&self) -> CursorKind { self.node().kind }

    fn spelling(&self) -> String { self.node().spelling.clone() }

    fn pretty_printed(&self) -> String {
        let node = self.node();
        node.pretty_printed.clone().unwrap_or_else(|| node.spelling.clone())
    }

    fn file_name(&self) -> Option<String> { self.node().file.clone() }

    fn is_definition(&self) -> bool { self.node().is_definition }

    fn visit_children<F>(&self, mut visitor: F)
    where
        F: FnMut(Self) -> ChildVisit,
    {
        self.walk(&mut visitor);
    }

    fn ty(&self) -> Option<Self::Type> {
        self.node().ty.map(|id| self.snap.ty(id))
    }

    fn result_type(&self) -> Option<Self::Type> {
        self.node().result_type.map(|id| self.snap.ty(id))
    }

    fn num_arguments(&self) -> i32 {
        let node = self.node();
        let callable = matches!(
            node.kind,
            CursorKind::ObjCInstanceMethodDecl | CursorKind::ObjCClassMethodDecl | CursorKind::FunctionDecl
        );
        match node.num_arguments {
            Some(n) => n,
            None if callable || !node.arguments.is_empty() => node.arguments.len() as i32,
            None => -1,
        }
    }

    fn argument(&self, index: usize) -> Option<Self> {
        self.node().arguments.get(index).map(|&id| self.wrap(id))
    }

    fn objc_property_attributes(&self) -> PropertyAttributes {
        PropertyAttributes::from_bits_retain(self.node().property_attributes)
    }

    fn objc_property_getter_name(&self) -> String {
        let node = self.node();
        node.getter.clone().unwrap_or_else(|| node.spelling.clone())
    }

    fn objc_property_setter_name(&self) -> String {
        let node = self.node();
        node.setter.clone().unwrap_or_else(|| default_setter(&node.spelling))
    }

    fn platform_availability(&self) -> PlatformAvailability {
        self.node().availability.clone()
    }

    fn referenced(&self) -> Option<Self> {
        self.node().referenced.map(|id| self.wrap(id))
    }

    fn definition(&self) -> Option<Self> {
        let node = self.node();
        match node.definition {
            Some(id) => Some(self.wrap(id)),
            None => node.is_definition.then_some(*self),
        }
    }
}

impl<'a> AstType for SnapshotType<'a> {
    type Decl = SnapshotCursor<'a>;

    fn spelling(&self) -> String { self.node().spelling.clone() }

    fn kind_spelling(&self) -> String { self.node().kind.clone() }

    fn canonical_type(&self) -> Self {
        self.node().canonical.map(|id| self.wrap(id)).unwrap_or(*self)
    }

    fn nullability(&self) -> NullabilityKind { self.node().nullability }

    fn size_of(&self) -> i64 { self.node().size }

    fn align_of(&self) -> i64 { self.node().align }

    fn array_element_type(&self) -> Option<Self> {
        self.node().element.map(|id| self.wrap(id))
    }

    fn array_size(&self) -> i64 { self.node().array_size }

    fn pointee_type(&self) -> Option<Self> {
        self.node().pointee.map(|id| self.wrap(id))
    }

    fn result_type(&self) -> Option<Self> {
        self.node().result.map(|id| self.wrap(id))
    }

    fn num_argument_types(&self) -> i32 {
        self.node().arguments.as_ref().map_or(-1, |args| args.len() as i32)
    }

    fn argument_type(&self, index: usize) -> Option<Self> {
        self.node().arguments.as_ref().and_then(|args| args.get(index)).map(|&id| self.wrap(id))
    }

    fn type_declaration(&self) -> Option<Self::Decl> {
        self.node().declaration.map(|id| self.snap.cursor(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<AstSnapshot, SnapshotError> {
        AstSnapshot::from_json(&value.to_string())
    }

    #[test]
    fn minimal_document_fills_defaults() {
        let snap = parse(json!({
            "cursors": [
                { "kind": "TranslationUnit", "spelling": "Foo.h", "children": [1] },
                { "kind": "ObjCPropertyDecl", "spelling": "name", "type": 0 }
            ],
            "types": [{ "spelling": "int", "kind": "Int" }]
        }))
        .unwrap();

        let root = snap.root().unwrap();
        assert_eq!(root.kind(), CursorKind::TranslationUnit);
        assert_eq!(root.num_arguments(), -1);

        let prop = root.children()[0];
        assert_eq!(prop.pretty_printed(), "name");
        assert_eq!(prop.objc_property_getter_name(), "name");
        assert_eq!(prop.objc_property_setter_name(), "setName:");
        assert!(prop.is_definition());
        assert_eq!(prop.definition().map(|d| d.id()), Some(CursorId(1)));

        let int = prop.ty().unwrap();
        assert_eq!(int.canonical_type().id(), int.id());
        assert_eq!(int.size_of(), -1);
        assert_eq!(int.array_size(), -1);
        assert_eq!(int.nullability(), NullabilityKind::Invalid);
        assert_eq!(int.num_argument_types(), -1);
    }

    #[test]
    fn parse_errors_carry_json_path() {
        let err = parse(json!({ "cursors": [{ "kind": "TranslationUnit", "children": ["x"] }] })).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cursors[0].children[0]"), "{message}");
    }

    #[test]
    fn missing_root_is_rejected() {
        let err = parse(json!({ "root": 3, "cursors": [{ "kind": "TranslationUnit" }] })).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingRoot(CursorId(3))));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let err = parse(json!({
            "cursors": [{ "kind": "TranslationUnit", "children": [7] }]
        }))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::DanglingCursor { field: "children", target: CursorId(7), .. }));

        let err = parse(json!({
            "cursors": [{ "kind": "TranslationUnit" }],
            "types": [{ "spelling": "int *", "kind": "Pointer", "pointee": 4 }]
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "type #0 field `composition` points at missing type #4");
    }

    #[test]
    fn composition_cycles_are_rejected() {
        let err = parse(json!({
            "cursors": [{ "kind": "TranslationUnit" }],
            "types": [
                { "spelling": "A", "kind": "Pointer", "pointee": 1 },
                { "spelling": "B", "kind": "Pointer", "pointee": 0 }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::TypeCycle(_)));

        let err = parse(json!({
            "cursors": [
                { "kind": "TranslationUnit", "children": [1] },
                { "kind": "ObjCInterfaceDecl", "children": [1] }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, SnapshotError::ChildCycle(CursorId(1))));
    }

    #[test]
    fn self_canonical_and_shared_children_are_fine() {
        let snap = parse(json!({
            "cursors": [
                { "kind": "TranslationUnit", "children": [1, 1] },
                { "kind": "ObjCInterfaceDecl", "spelling": "Foo" }
            ],
            "types": [{ "spelling": "int", "kind": "Int", "canonical": 0 }]
        }))
        .unwrap();
        assert_eq!(snap.root().unwrap().children().len(), 2);
    }

    #[test]
    fn visitor_directives_are_honoured() {
        let mut snap = AstSnapshot::default();
        let root = snap.push_cursor(CursorNode::new(CursorKind::TranslationUnit, "tu"));
        let a = snap.push_cursor(CursorNode::new(CursorKind::ObjCInterfaceDecl, "A"));
        let a1 = snap.push_cursor(CursorNode::new(CursorKind::ObjCPropertyDecl, "a1"));
        let b = snap.push_cursor(CursorNode::new(CursorKind::ObjCInterfaceDecl, "B"));
        snap.add_child(root, a);
        snap.add_child(a, a1);
        snap.add_child(root, b);

        let mut seen = Vec::new();
        snap.cursor(root).visit_children(|c| {
            seen.push(c.spelling());
            ChildVisit::Recurse
        });
        assert_eq!(seen, vec!["A", "a1", "B"]);

        let mut seen = Vec::new();
        snap.cursor(root).visit_children(|c| {
            seen.push(c.spelling());
            if c.spelling() == "a1" { ChildVisit::Break } else { ChildVisit::Recurse }
        });
        assert_eq!(seen, vec!["A", "a1"]);

        assert_eq!(snap.cursor(root).children().len(), 2);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut snap = AstSnapshot::default();
        let tu = snap.push_cursor(CursorNode::new(CursorKind::TranslationUnit, "tu"));
        let int = snap.push_type(TypeNode::builtin("int", "Int", 4));
        let ptr = snap.push_type(TypeNode::pointer("int *", int));
        let param = snap.push_cursor(CursorNode { ty: Some(ptr), ..CursorNode::new(CursorKind::ParmDecl, "p") });
        snap.add_child(tu, param);

        let text = serde_json::to_string(&snap).unwrap();
        assert_eq!(AstSnapshot::from_json(&text).unwrap(), snap);
    }
}
