//! Query surface over an already-parsed Objective-C AST.
//!
//! Everything the extractor knows about a header comes through these two traits.
//! They mirror the subset of libclang (`CXCursor` / `CXType`) the extractor needs,
//! so a live libclang session, a serialized dump ([`crate::snapshot`]) or a test
//! double can all stand behind them.
use serde::{Deserialize, Serialize};

use crate::availability::PlatformAvailability;

// ------------------------------- Enums ----------------------------------- //

/// Structural tag of a cursor, named after `CXCursorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    TranslationUnit,
    ObjCInterfaceDecl,
    ObjCCategoryDecl,
    ObjCProtocolDecl,
    ObjCSuperClassRef,
    ObjCProtocolRef,
    ObjCClassRef,
    ObjCPropertyDecl,
    ObjCInstanceMethodDecl,
    ObjCClassMethodDecl,
    ObjCIvarDecl,
    ParmDecl,
    TypeRef,
    TypedefDecl,
    StructDecl,
    EnumDecl,
    FunctionDecl,
    /// Anything the extractor has no use for.
    #[serde(other)]
    Other,
}

/// `CXTypeNullabilityKind`, in libclang's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullabilityKind {
    NonNull = 0,
    Nullable = 1,
    Unspecified = 2,
    #[default]
    Invalid = 3,
    NullableResult = 4,
}

/// What a child visitor wants to happen next (`CXChildVisitResult`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildVisit {
    Break,
    Continue,
    Recurse,
}

bitflags::bitflags! {
    /// `CXObjCPropertyAttrKind` bits as reported for a property cursor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyAttributes: u32 {
        const READONLY = 0x01;
        const GETTER = 0x02;
        const ASSIGN = 0x04;
        const READWRITE = 0x08;
        const RETAIN = 0x10;
        const COPY = 0x20;
        const NONATOMIC = 0x40;
        const SETTER = 0x80;
        const ATOMIC = 0x100;
        const WEAK = 0x200;
        const STRONG = 0x400;
        const UNSAFE_UNRETAINED = 0x800;
        const CLASS = 0x1000;
    }
}

/// Canonical kind spelling libclang uses for `^` types.
pub const BLOCK_POINTER_KIND: &str = "BlockPointer";

// ------------------------------- Traits ---------------------------------- //

/// One AST node.
pub trait AstCursor: Sized {
    type Type: AstType;

    fn kind(&self) -> CursorKind;
    fn spelling(&self) -> String;
    fn pretty_printed(&self) -> String;
    /// Path of the file the cursor's expansion location lives in.
    fn file_name(&self) -> Option<String>;
    fn is_definition(&self) -> bool;

    /// Single-level enumeration; `Recurse` descends into the visited child.
    fn visit_children<F>(&self, visitor: F)
    where
        F: FnMut(Self) -> ChildVisit;

    fn ty(&self) -> Option<Self::Type>;
    fn result_type(&self) -> Option<Self::Type>;
    /// Negative for cursors that take no arguments at all.
    fn num_arguments(&self) -> i32;
    fn argument(&self, index: usize) -> Option<Self>;

    fn objc_property_attributes(&self) -> PropertyAttributes;
    fn objc_property_getter_name(&self) -> String;
    fn objc_property_setter_name(&self) -> String;

    fn platform_availability(&self) -> PlatformAvailability;

    /// Target of a reference cursor (`ObjCSuperClassRef` → the class).
    fn referenced(&self) -> Option<Self>;
    fn definition(&self) -> Option<Self>;

    /// Collects the immediate children, in order.
    fn children(&self) -> Vec<Self> {
        let mut out = Vec::new();
        self.visit_children(|child| {
            out.push(child);
            ChildVisit::Continue
        });
        out
    }
}

/// One type occurrence.
pub trait AstType: Sized {
    type Decl: AstCursor;

    fn spelling(&self) -> String;
    fn kind_spelling(&self) -> String;
    fn canonical_type(&self) -> Self;
    fn nullability(&self) -> NullabilityKind;

    /// Negative values are `CXTypeLayoutError` sentinels.
    fn size_of(&self) -> i64;
    fn align_of(&self) -> i64;

    fn array_element_type(&self) -> Option<Self>;
    /// Negative when the type is not a constant-size array.
    fn array_size(&self) -> i64;
    fn pointee_type(&self) -> Option<Self>;

    fn result_type(&self) -> Option<Self>;
    /// Negative for non-function types.
    fn num_argument_types(&self) -> i32;
    fn argument_type(&self, index: usize) -> Option<Self>;

    fn type_declaration(&self) -> Option<Self::Decl>;
}
