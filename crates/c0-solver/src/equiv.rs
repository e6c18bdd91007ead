//! Structural type equivalence.
//!
//! Unions compare as sets: each member must have an equivalent on the
//! other side. Refinement predicates compare by pointer identity only
//! (predicate equivalence is undecidable; shared subtrees make identity
//! the useful approximation).

use std::rc::Rc;

use crate::types::{FuncParamSig, TypeKind, TypeRef};

fn params_equiv(lhs: &[FuncParamSig], rhs: &[FuncParamSig]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(a, b)| a.mode == b.mode && type_equiv(&a.ty, &b.ty))
}

fn union_equiv(lhs: &[TypeRef], rhs: &[TypeRef]) -> bool {
    lhs.iter().all(|a| rhs.iter().any(|b| type_equiv(a, b)))
        && rhs.iter().all(|b| lhs.iter().any(|a| type_equiv(a, b)))
}

/// Structural equivalence of two resolved types.
#[must_use]
pub fn type_equiv(lhs: &TypeRef, rhs: &TypeRef) -> bool {
    match (&**lhs, &**rhs) {
        (TypeKind::Prim(a), TypeKind::Prim(b)) => a == b,
        (
            TypeKind::Path {
                path: pa,
                generic_args: ga,
            },
            TypeKind::Path {
                path: pb,
                generic_args: gb,
            },
        ) => {
            pa == pb && ga.len() == gb.len() && ga.iter().zip(gb).all(|(a, b)| type_equiv(a, b))
        }
        (
            TypeKind::Perm { perm: qa, base: ba },
            TypeKind::Perm { perm: qb, base: bb },
        ) => qa == qb && type_equiv(ba, bb),
        (TypeKind::Tuple(a), TypeKind::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| type_equiv(x, y))
        }
        (
            TypeKind::Array { elem: ea, len: la },
            TypeKind::Array { elem: eb, len: lb },
        ) => la == lb && type_equiv(ea, eb),
        (TypeKind::Slice(a), TypeKind::Slice(b)) => type_equiv(a, b),
        (TypeKind::Union(a), TypeKind::Union(b)) => union_equiv(a, b),
        (
            TypeKind::Func {
                params: pa,
                ret: ra,
            },
            TypeKind::Func {
                params: pb,
                ret: rb,
            },
        ) => params_equiv(pa, pb) && type_equiv(ra, rb),
        (
            TypeKind::Ptr { elem: ea, state: sa },
            TypeKind::Ptr { elem: eb, state: sb },
        ) => sa == sb && type_equiv(ea, eb),
        (
            TypeKind::RawPtr { qual: qa, elem: ea },
            TypeKind::RawPtr { qual: qb, elem: eb },
        ) => qa == qb && type_equiv(ea, eb),
        (TypeKind::String(a), TypeKind::String(b)) => a == b,
        (TypeKind::Bytes(a), TypeKind::Bytes(b)) => a == b,
        (TypeKind::Dynamic(a), TypeKind::Dynamic(b)) => a == b,
        (
            TypeKind::ModalState {
                path: pa,
                state: sa,
                generic_args: ga,
            },
            TypeKind::ModalState {
                path: pb,
                state: sb,
                generic_args: gb,
            },
        ) => {
            pa == pb
                && sa == sb
                && ga.len() == gb.len()
                && ga.iter().zip(gb).all(|(a, b)| type_equiv(a, b))
        }
        (TypeKind::Range(a), TypeKind::Range(b)) => type_equiv(a, b),
        (
            TypeKind::Refine { base: ba, pred: qa },
            TypeKind::Refine { base: bb, pred: qb },
        ) => type_equiv(ba, bb) && Rc::ptr_eq(qa, qb),
        (TypeKind::SelfRef, TypeKind::SelfRef) => true,
        (TypeKind::Opaque, TypeKind::Opaque) => true,
        _ => false,
    }
}
