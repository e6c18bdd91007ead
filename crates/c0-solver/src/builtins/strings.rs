//! The `string` and `bytes` built-in value namespaces.
//!
//! Allocating functions take the heap and return `Managed |
//! AllocationError`; `append` is the only function that requires a
//! `Unique` receiver. Views are free.

use std::rc::Rc;

use c0_common::Interner;
use c0_syntax::types::{BytesState, Permission, PrimType, StringState};
use c0_syntax::{Identifier, ParamMode};

use crate::types::{FuncParamSig, TypeKind, TypeRef};
use crate::union::union_introduce;

/// Signature of a namespace function.
#[derive(Clone, Debug)]
pub struct BuiltinFnSig {
    pub params: Vec<FuncParamSig>,
    pub ret: TypeRef,
    /// Set only for `append`.
    pub unique_receiver: bool,
}

fn value_param(ty: TypeRef) -> FuncParamSig {
    FuncParamSig {
        mode: ParamMode::Value,
        ty,
    }
}

fn heap(interner: &Interner) -> TypeRef {
    TypeKind::perm(
        Permission::Shared,
        TypeKind::path(vec![interner.intern("Heap")]),
    )
}

fn alloc_error(interner: &Interner) -> TypeRef {
    TypeKind::path(vec![interner.intern("AllocationError")])
}

fn or_alloc_error(interner: &Interner, ok: TypeRef) -> TypeRef {
    union_introduce(vec![ok, alloc_error(interner)])
}

fn string_managed() -> TypeRef {
    Rc::new(TypeKind::String(Some(StringState::Managed)))
}

fn string_view() -> TypeRef {
    Rc::new(TypeKind::String(Some(StringState::View)))
}

fn bytes_managed() -> TypeRef {
    Rc::new(TypeKind::Bytes(Some(BytesState::Managed)))
}

fn bytes_view() -> TypeRef {
    Rc::new(TypeKind::Bytes(Some(BytesState::View)))
}

fn usize_ty() -> TypeRef {
    TypeKind::prim(PrimType::Usize)
}

fn namespace_fn(
    interner: &Interner,
    name: &str,
    managed: fn() -> TypeRef,
    view: fn() -> TypeRef,
    slice_elem: TypeRef,
) -> Option<BuiltinFnSig> {
    let sig = match name {
        "from" => BuiltinFnSig {
            params: vec![value_param(heap(interner)), value_param(view())],
            ret: or_alloc_error(interner, managed()),
            unique_receiver: false,
        },
        "with_capacity" => BuiltinFnSig {
            params: vec![value_param(heap(interner)), value_param(usize_ty())],
            ret: or_alloc_error(interner, managed()),
            unique_receiver: false,
        },
        "from_slice" => BuiltinFnSig {
            params: vec![
                value_param(heap(interner)),
                value_param(Rc::new(TypeKind::Slice(slice_elem))),
            ],
            ret: or_alloc_error(interner, managed()),
            unique_receiver: false,
        },
        "to_managed" => BuiltinFnSig {
            params: vec![value_param(heap(interner)), value_param(view())],
            ret: or_alloc_error(interner, managed()),
            unique_receiver: false,
        },
        "clone_with" => BuiltinFnSig {
            params: vec![value_param(heap(interner)), value_param(managed())],
            ret: or_alloc_error(interner, managed()),
            unique_receiver: false,
        },
        "append" => BuiltinFnSig {
            params: vec![
                value_param(TypeKind::perm(Permission::Unique, managed())),
                value_param(heap(interner)),
                value_param(view()),
            ],
            ret: or_alloc_error(interner, TypeKind::unit()),
            unique_receiver: true,
        },
        "as_view" => BuiltinFnSig {
            params: vec![value_param(managed())],
            ret: view(),
            unique_receiver: false,
        },
        "length" => BuiltinFnSig {
            params: vec![value_param(view())],
            ret: usize_ty(),
            unique_receiver: false,
        },
        "is_empty" => BuiltinFnSig {
            params: vec![value_param(view())],
            ret: TypeKind::prim(PrimType::Bool),
            unique_receiver: false,
        },
        _ => return None,
    };
    Some(sig)
}

/// Signature of a `string::` namespace function.
#[must_use]
pub fn lookup_string_fn(interner: &Interner, name: Identifier) -> Option<BuiltinFnSig> {
    let text = interner.resolve(name);
    match &*text {
        // `view` and `view_string` produce string views from bytes.
        "view_string" => Some(BuiltinFnSig {
            params: vec![value_param(bytes_view())],
            ret: string_view(),
            unique_receiver: false,
        }),
        other => namespace_fn(
            interner,
            other,
            string_managed,
            string_view,
            TypeKind::prim(PrimType::U8),
        ),
    }
}

/// Signature of a `bytes::` namespace function.
#[must_use]
pub fn lookup_bytes_fn(interner: &Interner, name: Identifier) -> Option<BuiltinFnSig> {
    let text = interner.resolve(name);
    match &*text {
        "view" => Some(BuiltinFnSig {
            params: vec![value_param(bytes_managed())],
            ret: bytes_view(),
            unique_receiver: false,
        }),
        "as_slice" => Some(BuiltinFnSig {
            params: vec![value_param(bytes_view())],
            ret: Rc::new(TypeKind::Slice(TypeKind::prim(PrimType::U8))),
            unique_receiver: false,
        }),
        other => namespace_fn(
            interner,
            other,
            bytes_managed,
            bytes_view,
            TypeKind::prim(PrimType::U8),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equiv::type_equiv;

    #[test]
    fn append_is_the_only_unique_receiver_fn() {
        let interner = Interner::new();
        for name in [
            "from",
            "with_capacity",
            "from_slice",
            "to_managed",
            "clone_with",
            "as_view",
            "length",
            "is_empty",
        ] {
            let sig = lookup_string_fn(&interner, interner.intern(name))
                .unwrap_or_else(|| panic!("{name} missing"));
            assert!(!sig.unique_receiver, "{name}");
        }
        let append = lookup_string_fn(&interner, interner.intern("append")).unwrap();
        assert!(append.unique_receiver);
    }

    #[test]
    fn allocating_fns_return_managed_or_allocation_error() {
        let interner = Interner::new();
        let sig = lookup_string_fn(&interner, interner.intern("from")).unwrap();
        let expected = union_introduce(vec![string_managed(), alloc_error(&interner)]);
        assert!(type_equiv(&sig.ret, &expected));
    }

    #[test]
    fn observers_are_cheap() {
        let interner = Interner::new();
        let length = lookup_bytes_fn(&interner, interner.intern("length")).unwrap();
        assert!(type_equiv(&length.ret, &usize_ty()));
        assert_eq!(length.params.len(), 1);
    }

    #[test]
    fn views_downgrade_without_allocation() {
        let interner = Interner::new();
        let as_view = lookup_bytes_fn(&interner, interner.intern("as_view")).unwrap();
        assert!(type_equiv(&as_view.ret, &bytes_view()));
        assert!(lookup_string_fn(&interner, interner.intern("view_string")).is_some());
    }
}
