//! Objective-C header metadata extraction.
//!
//! An already-parsed AST is queried through [`oracle`]; [`types`] turns type
//! handles into [`types::TypeMetadata`] and [`extract`] turns `@interface`
//! cursors into [`decl::InterfaceDecl`] records ready for JSON serialization.
pub mod availability;
pub mod cli;
pub mod config;
pub mod decl;
pub mod error;
pub mod extract;
pub mod framework;
pub mod oracle;
pub mod path_de;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::ExtractOptions;
pub use decl::{ClassRef, InterfaceDecl, MethodDecl, ParameterDecl, PropertyDecl};
pub use extract::Extractor;
pub use framework::{extract_framework, extract_snapshot, FrameworkMetadata};
pub use snapshot::AstSnapshot;
pub use types::{resolve_type, BlockSignature, TypeMetadata};
