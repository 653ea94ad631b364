//! Snapshot fixtures shared by the unit tests.
use crate::availability::{AvailabilityEntry, PlatformAvailability, Version};
use crate::oracle::{CursorKind, NullabilityKind};
use crate::snapshot::{AstSnapshot, CursorId, CursorNode, TypeId, TypeNode};

const FOUNDATION: &str = "/SDK/System/Library/Frameworks/Foundation.framework/Headers";

pub const FOO_HEADER: &str = "/work/Foo/Foo.h";
pub const FOUNDATION_NSOBJECT: &str = "/SDK/System/Library/Frameworks/Foundation.framework/Headers/NSObject.h";
pub const FOUNDATION_NSOBJCRUNTIME: &str =
    "/SDK/System/Library/Frameworks/Foundation.framework/Headers/NSObjCRuntime.h";

/// Commonly needed types, pushed into a snapshot once.
#[derive(Debug, Clone, Copy)]
pub struct TypeKit {
    pub void: TypeId,
    pub int: TypeId,
    pub bool_: TypeId,
    pub ns_integer: TypeId,
    pub id: TypeId,
    pub string: TypeId,
    pub nullable_string: TypeId,
    pub completion_block: TypeId,
}

impl TypeKit {
    pub fn new(snap: &mut AstSnapshot) -> Self {
        let void = snap.push_type(TypeNode::new("void", "Void"));
        let int = snap.push_type(TypeNode::builtin("int", "Int", 4));
        let long = snap.push_type(TypeNode::builtin("long", "Long", 8));
        let bool_canonical = snap.push_type(TypeNode::builtin("bool", "Bool", 1));
        let bool_ = snap.push_type(TypeNode {
            canonical: Some(bool_canonical),
            ..TypeNode::builtin("BOOL", "Typedef", 1)
        });

        let ns_integer_decl = snap.push_cursor(CursorNode {
            file: Some(FOUNDATION_NSOBJCRUNTIME.into()),
            ..CursorNode::new(CursorKind::TypedefDecl, "NSInteger")
        });
        let ns_integer = snap.push_type(TypeNode {
            canonical: Some(long),
            declaration: Some(ns_integer_decl),
            ..TypeNode::builtin("NSInteger", "Typedef", 8)
        });

        let id = snap.push_type(TypeNode {
            nullability: NullabilityKind::Unspecified,
            ..TypeNode::builtin("id", "ObjCObjectPointer", 8)
        });

        let ns_string_decl = snap.push_cursor(CursorNode {
            file: Some(format!("{FOUNDATION}/NSString.h")),
            ..CursorNode::new(CursorKind::ObjCInterfaceDecl, "NSString")
        });
        let ns_string = snap.push_type(TypeNode {
            declaration: Some(ns_string_decl),
            ..TypeNode::new("NSString", "ObjCInterface")
        });
        let string = snap.push_type(TypeNode {
            pointee: Some(ns_string),
            nullability: NullabilityKind::Unspecified,
            ..TypeNode::builtin("NSString *", "ObjCObjectPointer", 8)
        });
        let nullable_string = snap.push_type(TypeNode {
            canonical: Some(string),
            pointee: Some(ns_string),
            nullability: NullabilityKind::Nullable,
            ..TypeNode::builtin("NSString * _Nullable", "ObjCObjectPointer", 8)
        });

        let completion = snap.push_type(TypeNode {
            result: Some(void),
            arguments: Some(vec![bool_]),
            ..TypeNode::new("void (BOOL)", "FunctionProto")
        });
        let completion_block = snap.push_type(TypeNode::block("void (^)(BOOL)", completion));

        TypeKit { void, int, bool_, ns_integer, id, string, nullable_string, completion_block }
    }
}

pub fn property_node(name: &str, ty: TypeId, attributes: u32) -> CursorNode {
    CursorNode {
        ty: Some(ty),
        property_attributes: attributes,
        ..CursorNode::new(CursorKind::ObjCPropertyDecl, name)
    }
}

pub fn param_node(name: &str, ty: TypeId, pretty: &str) -> CursorNode {
    CursorNode {
        ty: Some(ty),
        pretty_printed: Some(pretty.into()),
        ..CursorNode::new(CursorKind::ParmDecl, name)
    }
}

pub fn method_node(kind: CursorKind, name: &str, pretty: &str, result: TypeId, arguments: &[CursorId]) -> CursorNode {
    CursorNode {
        result_type: Some(result),
        arguments: arguments.to_vec(),
        pretty_printed: Some(pretty.into()),
        ..CursorNode::new(kind, name)
    }
}

fn entry(platform: &str) -> AvailabilityEntry {
    AvailabilityEntry {
        platform: platform.into(),
        introduced: None,
        deprecated: None,
        obsoleted: None,
        unavailable: false,
        message: None,
    }
}

pub fn unavailable_on(platform: &str) -> PlatformAvailability {
    let entry = AvailabilityEntry { unavailable: true, ..entry(platform) };
    PlatformAvailability { platforms: vec![entry], ..Default::default() }
}

pub fn deprecated_on(platform: &str, version: Version) -> PlatformAvailability {
    let entry = AvailabilityEntry { deprecated: Some(version), ..entry(platform) };
    PlatformAvailability { platforms: vec![entry], ..Default::default() }
}

pub fn introduced_on(platform: &str, version: Version) -> PlatformAvailability {
    let entry = AvailabilityEntry { introduced: Some(version), ..entry(platform) };
    PlatformAvailability { platforms: vec![entry], ..Default::default() }
}

pub struct FooFixture {
    pub snapshot: AstSnapshot,
    pub interface: CursorId,
    pub kit: TypeKit,
}

/// ```text
/// @interface NSObject                          // Foundation.framework
/// @interface Foo : NSObject <NSCopying>        // Foo.h
/// @property (nonatomic, readonly) NSString *name;
/// - (void)doThing:(int)x;
/// @end
/// ```
pub fn foo_interface() -> FooFixture {
    let mut snapshot = AstSnapshot::default();
    let tu = snapshot.push_cursor(CursorNode::new(CursorKind::TranslationUnit, FOO_HEADER));
    let kit = TypeKit::new(&mut snapshot);

    let ns_object = snapshot.push_cursor(CursorNode {
        file: Some(FOUNDATION_NSOBJECT.into()),
        pretty_printed: Some("@interface NSObject\n@end".into()),
        ..CursorNode::new(CursorKind::ObjCInterfaceDecl, "NSObject")
    });
    let super_ref = snapshot.push_cursor(CursorNode {
        file: Some(FOO_HEADER.into()),
        referenced: Some(ns_object),
        ..CursorNode::new(CursorKind::ObjCSuperClassRef, "NSObject")
    });
    let copying = snapshot.push_cursor(CursorNode {
        file: Some(FOO_HEADER.into()),
        ..CursorNode::new(CursorKind::ObjCProtocolRef, "NSCopying")
    });
    let name = snapshot.push_cursor(CursorNode {
        file: Some(FOO_HEADER.into()),
        pretty_printed: Some("@property(nonatomic, readonly) NSString *name;".into()),
        ..property_node("name", kit.string, 0x41)
    });
    let x = snapshot.push_cursor(param_node("x", kit.int, "int x"));
    let do_thing = snapshot.push_cursor(CursorNode {
        file: Some(FOO_HEADER.into()),
        ..method_node(CursorKind::ObjCInstanceMethodDecl, "doThing:", "- (void)doThing:(int)x;", kit.void, &[x])
    });

    let interface = snapshot.push_cursor(CursorNode {
        file: Some(FOO_HEADER.into()),
        pretty_printed: Some(
            "@interface Foo : NSObject <NSCopying>\n@property(nonatomic, readonly) NSString *name;\n- (void)doThing:(int)x;\n@end"
                .into(),
        ),
        children: vec![super_ref, copying, name, do_thing],
        ..CursorNode::new(CursorKind::ObjCInterfaceDecl, "Foo")
    });

    snapshot.add_child(tu, ns_object);
    snapshot.add_child(tu, interface);
    snapshot.root = tu;

    FooFixture { snapshot, interface, kit }
}
