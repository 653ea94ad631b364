use crate::decl::{MethodDecl, ParameterDecl};
use crate::oracle::AstCursor;
use crate::types::{resolve_or_invalid, TypeMetadata};

use super::Extractor;

impl Extractor {
    pub fn method<C: AstCursor>(&self, cursor: &C) -> Option<MethodDecl> {
        let availability = self.gate(cursor)?;

        let arity = cursor.num_arguments().max(0) as usize;
        let parameters = (0..arity).map(|i| parameter(cursor.argument(i))).collect();

        Some(MethodDecl {
            name: cursor.spelling(),
            parameters,
            result: resolve_or_invalid(cursor.result_type()),
            type_string: cursor.pretty_printed(),
            availability,
        })
    }
}

fn parameter<C: AstCursor>(arg: Option<C>) -> ParameterDecl {
    match arg {
        Some(arg) => ParameterDecl {
            name: arg.spelling(),
            ty: resolve_or_invalid(arg.ty()),
            type_string: arg.pretty_printed(),
        },
        // keeps the declared arity intact
        None => ParameterDecl { name: String::new(), ty: TypeMetadata::invalid(), type_string: String::new() },
    }
}
