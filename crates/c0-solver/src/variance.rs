//! Variance computation for generic type parameters.
//!
//! Structural descent: type-path heads count covariantly, function
//! parameters invert, mutable storage positions are invariant, and
//! unseen parameters are bivariant. Composition and joining follow the
//! lattice with bivariant as identity and invariant absorbing.

use c0_syntax::types::Permission;
use c0_syntax::Identifier;

use crate::equiv::type_equiv;
use crate::types::{TypeKind, TypeRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Covariant,
    Contravariant,
    Invariant,
    Bivariant,
}

/// Compose an outer position with an inner occurrence.
/// Bivariant is the identity; invariant absorbs; like signs compose to
/// covariant, unlike to contravariant.
#[must_use]
pub fn combine_variance(outer: Variance, inner: Variance) -> Variance {
    use Variance::*;
    match (outer, inner) {
        (Bivariant, v) | (v, Bivariant) => v,
        (Invariant, _) | (_, Invariant) => Invariant,
        (Covariant, Covariant) | (Contravariant, Contravariant) => Covariant,
        _ => Contravariant,
    }
}

/// Join two parallel occurrences of the same parameter.
#[must_use]
pub fn join_variance(a: Variance, b: Variance) -> Variance {
    use Variance::*;
    match (a, b) {
        (Bivariant, v) | (v, Bivariant) => v,
        _ if a == b => a,
        _ => Invariant,
    }
}

/// Flip co- and contravariance.
#[must_use]
pub fn invert_variance(v: Variance) -> Variance {
    match v {
        Variance::Covariant => Variance::Contravariant,
        Variance::Contravariant => Variance::Covariant,
        Variance::Invariant => Variance::Invariant,
        Variance::Bivariant => Variance::Bivariant,
    }
}

/// Variance of a mutable storage position: any occurrence pins the
/// parameter to invariant.
fn var_mut(ty: &TypeRef, param: Identifier) -> Variance {
    match variance_of(ty, param) {
        Variance::Bivariant => Variance::Bivariant,
        _ => Variance::Invariant,
    }
}

/// How `param` occurs in `ty`.
#[must_use]
pub fn variance_of(ty: &TypeRef, param: Identifier) -> Variance {
    match &**ty {
        TypeKind::Path { path, generic_args } => {
            if path.len() == 1 && path[0] == param {
                return Variance::Covariant;
            }
            generic_args
                .iter()
                .fold(Variance::Bivariant, |acc, arg| {
                    join_variance(acc, variance_of(arg, param))
                })
        }
        TypeKind::Perm { perm, base } => match perm {
            Permission::Unique | Permission::Shared => var_mut(base, param),
            Permission::Const => variance_of(base, param),
        },
        TypeKind::Func { params, ret } => {
            let from_params = params.iter().fold(Variance::Bivariant, |acc, p| {
                join_variance(acc, invert_variance(variance_of(&p.ty, param)))
            });
            join_variance(from_params, variance_of(ret, param))
        }
        TypeKind::Tuple(elems) | TypeKind::Union(elems) => elems
            .iter()
            .fold(Variance::Bivariant, |acc, elem| {
                join_variance(acc, variance_of(elem, param))
            }),
        TypeKind::Array { elem, .. } | TypeKind::Slice(elem) => var_mut(elem, param),
        TypeKind::Ptr { elem, .. } => variance_of(elem, param),
        TypeKind::Range(elem) => variance_of(elem, param),
        TypeKind::ModalState { generic_args, .. } => generic_args
            .iter()
            .fold(Variance::Bivariant, |acc, arg| {
                join_variance(acc, variance_of(arg, param))
            }),
        TypeKind::Refine { base, .. } => variance_of(base, param),
        TypeKind::RawPtr { elem, .. } => var_mut(elem, param),
        TypeKind::Prim(_)
        | TypeKind::String(_)
        | TypeKind::Bytes(_)
        | TypeKind::Dynamic(_)
        | TypeKind::SelfRef
        | TypeKind::Opaque => Variance::Bivariant,
    }
}

/// Pointwise generic-instantiation subtyping under computed variances.
/// `subtype` decides the directional checks.
#[must_use]
pub fn check_generic_subtyping(
    variances: &[Variance],
    args1: &[TypeRef],
    args2: &[TypeRef],
    subtype: impl Fn(&TypeRef, &TypeRef) -> bool,
) -> bool {
    if args1.len() != args2.len() || variances.len() != args1.len() {
        return false;
    }
    variances
        .iter()
        .zip(args1.iter().zip(args2))
        .all(|(&variance, (a1, a2))| match variance {
            Variance::Covariant => subtype(a1, a2),
            Variance::Contravariant => subtype(a2, a1),
            Variance::Invariant => type_equiv(a1, a2),
            Variance::Bivariant => true,
        })
}
