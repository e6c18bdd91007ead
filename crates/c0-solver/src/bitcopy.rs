//! Bitcopy classification.
//!
//! A type is bitcopy when its representation can be duplicated by memcpy
//! without running user code. The rule is structural: primitives and all
//! indirection-shaped types are bitcopy, `Unique` permission breaks it,
//! composites propagate, and nominals opt in via `implements Bitcopy`.

use c0_binder::{Sigma, TypeDecl};
use c0_syntax::types::{BytesState, Permission, StringState};

use crate::types::{TypeKind, TypeRef};

/// Whether a resolved type is bitcopy under Σ.
///
/// `bitcopy_class` is the interned identifier of the builtin `Bitcopy`
/// class, threaded in so nominal opt-ins can be recognized without a
/// string lookup per node.
#[must_use]
pub fn is_bitcopy(sigma: &Sigma, bitcopy_class: c0_syntax::Identifier, ty: &TypeRef) -> bool {
    match &**ty {
        TypeKind::Prim(_) => true,
        TypeKind::Ptr { .. }
        | TypeKind::RawPtr { .. }
        | TypeKind::Slice(_)
        | TypeKind::Func { .. }
        | TypeKind::Dynamic(_)
        | TypeKind::Range(_) => true,
        TypeKind::Perm { perm, base } => {
            *perm != Permission::Unique && is_bitcopy(sigma, bitcopy_class, base)
        }
        TypeKind::Tuple(elems) | TypeKind::Union(elems) => elems
            .iter()
            .all(|elem| is_bitcopy(sigma, bitcopy_class, elem)),
        TypeKind::Array { elem, .. } => is_bitcopy(sigma, bitcopy_class, elem),
        TypeKind::String(state) => *state == Some(StringState::View),
        TypeKind::Bytes(state) => *state == Some(BytesState::View),
        TypeKind::Path { path, .. } => nominal_is_bitcopy(sigma, bitcopy_class, path),
        TypeKind::ModalState { path, .. } => nominal_is_bitcopy(sigma, bitcopy_class, path),
        TypeKind::Refine { base, .. } => is_bitcopy(sigma, bitcopy_class, base),
        TypeKind::SelfRef | TypeKind::Opaque => false,
    }
}

fn nominal_is_bitcopy(
    sigma: &Sigma,
    bitcopy_class: c0_syntax::Identifier,
    path: &c0_syntax::TypePath,
) -> bool {
    let Some(decl) = sigma.type_decl(path) else {
        return false;
    };
    let implements = match decl {
        TypeDecl::Record(record) => &record.implements,
        TypeDecl::Enum(enum_decl) => &enum_decl.implements,
        TypeDecl::Modal(modal) => &modal.implements,
        TypeDecl::Alias(_) => return false,
    };
    implements
        .iter()
        .any(|class_path| class_path.last() == Some(&bitcopy_class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use c0_common::{Interner, Span};
    use c0_syntax::types::PrimType;
    use c0_syntax::{RecordDecl, Visibility, path_key};
    use std::rc::Rc;

    fn record(interner: &Interner, name: &str, implements: &[&str]) -> (c0_syntax::PathKey, TypeDecl) {
        let decl = RecordDecl {
            vis: Visibility::Public,
            name: interner.intern(name),
            generics: Vec::new(),
            implements: implements.iter().map(|s| vec![interner.intern(s)]).collect(),
            members: Vec::new(),
            span: Span::dummy(),
        };
        (
            path_key(&[interner.intern(name)]),
            TypeDecl::Record(decl),
        )
    }

    fn sigma_with(interner: &Interner, records: &[(&str, &[&str])]) -> Sigma {
        let mut sigma = Sigma::default();
        for (name, implements) in records {
            let (key, decl) = record(interner, name, implements);
            sigma.types.insert(key, decl);
        }
        sigma
    }

    #[test]
    fn prims_and_pointers_are_bitcopy() {
        let interner = Interner::new();
        let bitcopy = interner.intern("Bitcopy");
        let sigma = Sigma::default();
        assert!(is_bitcopy(&sigma, bitcopy, &TypeKind::prim(PrimType::I64)));
        assert!(is_bitcopy(
            &sigma,
            bitcopy,
            &TypeKind::ptr(TypeKind::prim(PrimType::I64), None)
        ));
    }

    #[test]
    fn unique_permission_breaks_bitcopy() {
        let interner = Interner::new();
        let bitcopy = interner.intern("Bitcopy");
        let sigma = Sigma::default();
        let base = TypeKind::prim(PrimType::I32);
        assert!(is_bitcopy(
            &sigma,
            bitcopy,
            &TypeKind::perm(Permission::Const, Rc::clone(&base))
        ));
        assert!(is_bitcopy(
            &sigma,
            bitcopy,
            &TypeKind::perm(Permission::Shared, Rc::clone(&base))
        ));
        assert!(!is_bitcopy(
            &sigma,
            bitcopy,
            &TypeKind::perm(Permission::Unique, base)
        ));
    }

    #[test]
    fn tuples_and_arrays_propagate() {
        let interner = Interner::new();
        let bitcopy = interner.intern("Bitcopy");
        let sigma = Sigma::default();
        let unique = TypeKind::perm(Permission::Unique, TypeKind::prim(PrimType::I32));
        let clean = Rc::new(TypeKind::Tuple(vec![
            TypeKind::prim(PrimType::Bool),
            TypeKind::prim(PrimType::I8),
        ]));
        let dirty = Rc::new(TypeKind::Tuple(vec![TypeKind::prim(PrimType::Bool), unique]));
        assert!(is_bitcopy(&sigma, bitcopy, &clean));
        assert!(!is_bitcopy(&sigma, bitcopy, &dirty));
    }

    #[test]
    fn strings_are_bitcopy_only_in_view_state() {
        let interner = Interner::new();
        let bitcopy = interner.intern("Bitcopy");
        let sigma = Sigma::default();
        assert!(is_bitcopy(
            &sigma,
            bitcopy,
            &Rc::new(TypeKind::String(Some(StringState::View)))
        ));
        assert!(!is_bitcopy(
            &sigma,
            bitcopy,
            &Rc::new(TypeKind::String(Some(StringState::Managed)))
        ));
        assert!(!is_bitcopy(&sigma, bitcopy, &Rc::new(TypeKind::String(None))));
    }

    #[test]
    fn nominals_opt_in_via_implements() {
        let interner = Interner::new();
        let bitcopy = interner.intern("Bitcopy");
        let sigma = sigma_with(&interner, &[("Plain", &[]), ("Flat", &["Bitcopy"])]);
        let plain = TypeKind::path(vec![interner.intern("Plain")]);
        let flat = TypeKind::path(vec![interner.intern("Flat")]);
        assert!(!is_bitcopy(&sigma, bitcopy, &plain));
        assert!(is_bitcopy(&sigma, bitcopy, &flat));
    }
}
