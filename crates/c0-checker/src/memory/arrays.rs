//! Array, slice, and range indexing rules.
//!
//! Slices may not be indexed directly by `usize`, array indices must be
//! compile-time constants, and indexing by range produces a copy of the
//! elements, so the element type must be bitcopy.

use c0_binder::Sigma;
use c0_syntax::expr::{ExprNode, ExprPtr, Lit};
use c0_syntax::Identifier;
use c0_solver::{TypeKind, TypeRef, is_bitcopy, strip_perm};

/// Rule outcome: the rule ID to diagnose, or `None` when legal.
pub type IndexJudgment = Option<&'static str>;

fn is_const_index(index: &ExprPtr) -> bool {
    matches!(index.node, ExprNode::Literal(Lit::Int(_)))
}

fn is_range_index(index: &ExprPtr) -> bool {
    matches!(index.node, ExprNode::Range { .. })
}

/// Direct `usize` indexing into a slice is never legal.
#[must_use]
pub fn check_slice_index(base_ty: &TypeRef, index: &ExprPtr) -> IndexJudgment {
    let TypeKind::Slice(_) = &*strip_perm(base_ty) else {
        return None;
    };
    if is_range_index(index) {
        return None;
    }
    Some("Index-Slice-Direct-Err")
}

/// Array indexing requires a compile-time constant index.
#[must_use]
pub fn check_array_index(base_ty: &TypeRef, index: &ExprPtr) -> IndexJudgment {
    let TypeKind::Array { .. } = &*strip_perm(base_ty) else {
        return None;
    };
    if is_range_index(index) || is_const_index(index) {
        return None;
    }
    Some("Index-Array-NonConst-Err")
}

/// Indexing by range copies elements; the element type must be bitcopy.
#[must_use]
pub fn check_range_index(
    sigma: &Sigma,
    bitcopy_class: Identifier,
    base_ty: &TypeRef,
    index: &ExprPtr,
) -> IndexJudgment {
    if !is_range_index(index) {
        return None;
    }
    let elem = match &*strip_perm(base_ty) {
        TypeKind::Array { elem, .. } | TypeKind::Slice(elem) => elem.clone(),
        _ => return None,
    };
    if is_bitcopy(sigma, bitcopy_class, &elem) {
        None
    } else {
        Some("ValueUse-NonBitcopyPlace")
    }
}
