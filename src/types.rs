//! Type resolution: oracle type handle → self-contained [`TypeMetadata`] tree.
//!
//! The tree mirrors the written type expression: pointers and arrays recurse
//! through `pointeeType` / `elementType`, and block pointers additionally carry
//! their call signature. Each occurrence is resolved independently, so there is
//! nothing to memoize and no cycles to guard against.
use serde::{Deserialize, Serialize};

use crate::oracle::{AstCursor, AstType, NullabilityKind, BLOCK_POINTER_KIND};

// -------------------------------- Model ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub kind: String,
    pub nullable: NullabilityKind,
    pub canonical: String,
    pub canonical_kind: String,
    /// Absent for incomplete or dependent types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<TypeMetadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointee_type: Option<Box<TypeMetadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSignature {
    /// Absent for `void` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Box<TypeMetadata>>,
    pub parameters: Vec<TypeMetadata>,
}

impl TypeMetadata {
    /// Stand-in for a type the oracle could not produce.
    pub fn invalid() -> Self {
        TypeMetadata {
            name: String::new(),
            file: None,
            kind: "Invalid".to_string(),
            nullable: NullabilityKind::Invalid,
            canonical: String::new(),
            canonical_kind: "Invalid".to_string(),
            size: None,
            alignment: None,
            element_type: None,
            pointee_type: None,
            array_size: None,
            block: None,
        }
    }
}

// ------------------------------- Resolve --------------------------------- //

pub fn resolve_type<T: AstType>(ty: &T) -> TypeMetadata {
    let canonical = ty.canonical_type();
    let canonical_kind = canonical.kind_spelling();
    let element = ty.array_element_type();
    let pointee = ty.pointee_type();

    let block = match &pointee {
        Some(signature) if canonical_kind == BLOCK_POINTER_KIND => Some(resolve_block(signature)),
        _ => None,
    };

    TypeMetadata {
        name: ty.spelling(),
        file: declaration_file(ty),
        kind: ty.kind_spelling(),
        nullable: ty.nullability(),
        canonical: canonical.spelling(),
        canonical_kind,
        size: layout(ty.size_of()),
        alignment: layout(ty.align_of()),
        element_type: element.as_ref().map(|el| Box::new(resolve_type(el))),
        pointee_type: pointee.as_ref().map(|p| Box::new(resolve_type(p))),
        array_size: layout(ty.array_size()),
        block,
    }
}

/// Resolve an optional handle, falling back to [`TypeMetadata::invalid`].
pub fn resolve_or_invalid<T: AstType>(ty: Option<T>) -> TypeMetadata {
    ty.as_ref().map(resolve_type).unwrap_or_else(TypeMetadata::invalid)
}

fn resolve_block<T: AstType>(signature: &T) -> BlockSignature {
    let return_type = signature
        .result_type()
        .filter(|result| !matches!(result.canonical_type().kind_spelling().as_str(), "Void" | "Invalid"))
        .map(|result| Box::new(resolve_type(&result)));

    let arity = signature.num_argument_types().max(0) as usize;
    let parameters = (0..arity)
        .map(|i| resolve_or_invalid(signature.argument_type(i)))
        .collect();

    BlockSignature { return_type, parameters }
}

fn declaration_file<T: AstType>(ty: &T) -> Option<String> {
    ty.type_declaration()
        .and_then(|decl| decl.definition())
        .and_then(|def| def.file_name())
}

// Negative oracle values are sentinels (layout errors, non-constant arrays).
fn layout(raw: i64) -> Option<u64> {
    u64::try_from(raw).ok()
}
