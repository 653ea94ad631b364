use crate::decl::PropertyDecl;
use crate::oracle::{AstCursor, PropertyAttributes};
use crate::types::resolve_or_invalid;

use super::Extractor;

impl Extractor {
    pub fn property<C: AstCursor>(&self, cursor: &C) -> Option<PropertyDecl> {
        let availability = self.gate(cursor)?;
        let attrs = cursor.objc_property_attributes();

        Some(PropertyDecl {
            name: cursor.spelling(),
            ty: resolve_or_invalid(cursor.ty()),
            getter: cursor.objc_property_getter_name(),
            setter: cursor.objc_property_setter_name(),
            is_static: attrs.contains(PropertyAttributes::CLASS),
            readonly: attrs.contains(PropertyAttributes::READONLY),
            nonatomic: attrs.contains(PropertyAttributes::NONATOMIC),
            weak: attrs.contains(PropertyAttributes::WEAK),
            availability,
        })
    }
}
