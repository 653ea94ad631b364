use std::path::PathBuf;

use thiserror::Error;

use crate::snapshot::{CursorId, TypeId};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] JsonPathError),

    #[error("root cursor {0} does not exist")]
    MissingRoot(CursorId),

    #[error("{from} field `{field}` points at missing cursor {target}")]
    DanglingCursor { from: String, field: &'static str, target: CursorId },

    #[error("{from} field `{field}` points at missing type {target}")]
    DanglingType { from: String, field: &'static str, target: TypeId },

    #[error("cursor {0} is its own ancestor")]
    ChildCycle(CursorId),

    #[error("type {0} is part of a composition cycle")]
    TypeCycle(TypeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version `{0}` (expected major[.minor[.subminor]])")]
pub struct VersionParseError(pub String);

/// Deserialization failure with the JSON path it happened at.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct JsonPathError {
    pub path: String,
    pub message: String,
}
