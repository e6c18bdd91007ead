//! Lowering syntactic types to resolved `TypeRef`s.
//!
//! Lowering assumes paths were already rewritten to canonical form by the
//! resolver; it evaluates constant array lengths and substitutes `Self`
//! when building class and modal signatures.

use std::rc::Rc;

use c0_syntax::expr::{ExprNode, Lit};
use c0_syntax::types::{Permission, Type, TypeNode};
use c0_syntax::{ParamMode, Receiver, ReceiverPerm};

use crate::types::{ConstLen, FuncParamSig, ReceiverSig, TypeKind, TypeRef};

/// Evaluate an array-length expression to a constant when it is one.
fn const_len(expr: &c0_syntax::ExprPtr) -> ConstLen {
    match &expr.node {
        ExprNode::Literal(Lit::Int(value)) if *value >= 0 => ConstLen::Known(*value as u128),
        _ => ConstLen::Opaque,
    }
}

/// Lower a method receiver to its signature form.
#[must_use]
pub fn lower_receiver_perm(receiver: &Receiver) -> ReceiverSig {
    match receiver.perm {
        ReceiverPerm::Value => ReceiverSig::Value,
        ReceiverPerm::Const => ReceiverSig::Perm(Permission::Const),
        ReceiverPerm::Unique => ReceiverSig::Perm(Permission::Unique),
        ReceiverPerm::Shared => ReceiverSig::Perm(Permission::Shared),
    }
}

/// Lower a resolved syntactic type.
#[must_use]
pub fn lower_type(ty: &Rc<Type>) -> TypeRef {
    match &ty.node {
        TypeNode::Prim(prim) => TypeKind::prim(*prim),
        TypeNode::Path { path, generic_args } => Rc::new(TypeKind::Path {
            path: path.clone(),
            generic_args: generic_args.iter().map(lower_type).collect(),
        }),
        TypeNode::Perm { perm, base } => TypeKind::perm(*perm, lower_type(base)),
        TypeNode::Tuple(elems) => Rc::new(TypeKind::Tuple(elems.iter().map(lower_type).collect())),
        TypeNode::Array { elem, len } => Rc::new(TypeKind::Array {
            elem: lower_type(elem),
            len: const_len(len),
        }),
        TypeNode::Slice(elem) => Rc::new(TypeKind::Slice(lower_type(elem))),
        TypeNode::Union(members) => {
            crate::union::union_introduce(members.iter().map(lower_type).collect())
        }
        TypeNode::Func { params, ret } => Rc::new(TypeKind::Func {
            params: params
                .iter()
                .map(|param| FuncParamSig {
                    mode: ParamMode::Value,
                    ty: lower_type(&param.ty),
                })
                .collect(),
            ret: lower_type(ret),
        }),
        TypeNode::Ptr { elem, state } => TypeKind::ptr(lower_type(elem), *state),
        TypeNode::RawPtr { qual, elem } => Rc::new(TypeKind::RawPtr {
            qual: *qual,
            elem: lower_type(elem),
        }),
        TypeNode::String(state) => Rc::new(TypeKind::String(*state)),
        TypeNode::Bytes(state) => Rc::new(TypeKind::Bytes(*state)),
        TypeNode::Dynamic(class_path) => Rc::new(TypeKind::Dynamic(class_path.clone())),
        TypeNode::ModalState {
            path,
            state,
            generic_args,
        } => TypeKind::modal_state(
            path.clone(),
            *state,
            generic_args.iter().map(lower_type).collect(),
        ),
        TypeNode::Refine { base, pred } => Rc::new(TypeKind::Refine {
            base: lower_type(base),
            pred: Rc::clone(pred),
        }),
        TypeNode::SelfType => Rc::new(TypeKind::SelfRef),
        TypeNode::Error => Rc::new(TypeKind::Opaque),
    }
}

/// Replace `Self` with a concrete type throughout.
#[must_use]
pub fn subst_self(ty: &TypeRef, self_ty: &TypeRef) -> TypeRef {
    match &**ty {
        TypeKind::SelfRef => Rc::clone(self_ty),
        TypeKind::Perm { perm, base } => TypeKind::perm(*perm, subst_self(base, self_ty)),
        TypeKind::Tuple(elems) => Rc::new(TypeKind::Tuple(
            elems.iter().map(|elem| subst_self(elem, self_ty)).collect(),
        )),
        TypeKind::Array { elem, len } => Rc::new(TypeKind::Array {
            elem: subst_self(elem, self_ty),
            len: *len,
        }),
        TypeKind::Slice(elem) => Rc::new(TypeKind::Slice(subst_self(elem, self_ty))),
        TypeKind::Union(members) => Rc::new(TypeKind::Union(
            members
                .iter()
                .map(|member| subst_self(member, self_ty))
                .collect(),
        )),
        TypeKind::Func { params, ret } => Rc::new(TypeKind::Func {
            params: params
                .iter()
                .map(|param| FuncParamSig {
                    mode: param.mode,
                    ty: subst_self(&param.ty, self_ty),
                })
                .collect(),
            ret: subst_self(ret, self_ty),
        }),
        TypeKind::Ptr { elem, state } => TypeKind::ptr(subst_self(elem, self_ty), *state),
        TypeKind::RawPtr { qual, elem } => Rc::new(TypeKind::RawPtr {
            qual: *qual,
            elem: subst_self(elem, self_ty),
        }),
        TypeKind::Path { path, generic_args } => Rc::new(TypeKind::Path {
            path: path.clone(),
            generic_args: generic_args
                .iter()
                .map(|arg| subst_self(arg, self_ty))
                .collect(),
        }),
        TypeKind::ModalState {
            path,
            state,
            generic_args,
        } => TypeKind::modal_state(
            path.clone(),
            *state,
            generic_args
                .iter()
                .map(|arg| subst_self(arg, self_ty))
                .collect(),
        ),
        TypeKind::Range(elem) => Rc::new(TypeKind::Range(subst_self(elem, self_ty))),
        TypeKind::Refine { base, pred } => Rc::new(TypeKind::Refine {
            base: subst_self(base, self_ty),
            pred: Rc::clone(pred),
        }),
        TypeKind::Prim(_)
        | TypeKind::String(_)
        | TypeKind::Bytes(_)
        | TypeKind::Dynamic(_)
        | TypeKind::Opaque => Rc::clone(ty),
    }
}

/// Whether `Self` occurs at a by-value position: at the top level or
/// inside tuples, arrays, and unions, but not behind any pointer or
/// function indirection.
#[must_use]
pub fn self_by_value(ty: &TypeRef) -> bool {
    match &**ty {
        TypeKind::SelfRef => true,
        TypeKind::Perm { base, .. } => self_by_value(base),
        TypeKind::Tuple(elems) | TypeKind::Union(elems) => elems.iter().any(self_by_value),
        TypeKind::Array { elem, .. } => self_by_value(elem),
        _ => false,
    }
}
