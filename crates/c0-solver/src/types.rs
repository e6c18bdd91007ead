//! Resolved type references.
//!
//! `TypeRef` is the post-resolution type form: nominal heads carry their
//! canonical declaring paths, and subtrees are `Rc`-shared so signature
//! construction and substitution can reuse pieces freely.

use std::rc::Rc;

use c0_syntax::expr::ExprPtr;
use c0_syntax::types::{BytesState, Permission, PrimType, PtrState, RawPtrQual, StringState};
use c0_syntax::{Identifier, ParamMode, TypePath};

pub type TypeRef = Rc<TypeKind>;

/// Array length after lowering: a compile-time constant, or opaque when
/// the length expression was not a constant (diagnosed separately).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstLen {
    Known(u128),
    Opaque,
}

/// Parameter of a resolved function type or method signature.
#[derive(Clone, Debug)]
pub struct FuncParamSig {
    pub mode: ParamMode,
    pub ty: TypeRef,
}

/// Receiver of a resolved method signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiverSig {
    /// `self` taken by value.
    Value,
    Perm(Permission),
}

/// A resolved method signature, with `Self` already substituted.
#[derive(Clone, Debug)]
pub struct MethodSig {
    pub receiver: Option<ReceiverSig>,
    pub params: Vec<FuncParamSig>,
    pub ret: TypeRef,
}

/// The resolved type variants.
#[derive(Clone, Debug)]
pub enum TypeKind {
    /// Built-in scalar.
    Prim(PrimType),
    /// Nominal reference by canonical declaring path.
    Path {
        path: TypePath,
        generic_args: Vec<TypeRef>,
    },
    /// Permission-qualified type.
    Perm { perm: Permission, base: TypeRef },
    Tuple(Vec<TypeRef>),
    Array { elem: TypeRef, len: ConstLen },
    Slice(TypeRef),
    /// Structural sum; construction de-duplicates members.
    Union(Vec<TypeRef>),
    Func {
        params: Vec<FuncParamSig>,
        ret: TypeRef,
    },
    /// Safe pointer with optional state refinement.
    Ptr {
        elem: TypeRef,
        state: Option<PtrState>,
    },
    RawPtr { qual: RawPtrQual, elem: TypeRef },
    String(Option<StringState>),
    Bytes(Option<BytesState>),
    /// Type-erased class instance.
    Dynamic(TypePath),
    /// Modal nominal refined by a state.
    ModalState {
        path: TypePath,
        state: Identifier,
        generic_args: Vec<TypeRef>,
    },
    /// Range over an element type.
    Range(TypeRef),
    /// Dependent refinement; the predicate is a resolved expression.
    Refine { base: TypeRef, pred: ExprPtr },
    /// `Self` prior to substitution.
    SelfRef,
    /// Type still under inference.
    Opaque,
}

impl TypeKind {
    #[must_use]
    pub fn unit() -> TypeRef {
        Rc::new(TypeKind::Prim(PrimType::Unit))
    }

    #[must_use]
    pub fn never() -> TypeRef {
        Rc::new(TypeKind::Prim(PrimType::Never))
    }

    #[must_use]
    pub fn prim(prim: PrimType) -> TypeRef {
        Rc::new(TypeKind::Prim(prim))
    }

    #[must_use]
    pub fn path(path: TypePath) -> TypeRef {
        Rc::new(TypeKind::Path {
            path,
            generic_args: Vec::new(),
        })
    }

    #[must_use]
    pub fn perm(perm: Permission, base: TypeRef) -> TypeRef {
        Rc::new(TypeKind::Perm { perm, base })
    }

    #[must_use]
    pub fn ptr(elem: TypeRef, state: Option<PtrState>) -> TypeRef {
        Rc::new(TypeKind::Ptr { elem, state })
    }

    #[must_use]
    pub fn modal_state(path: TypePath, state: Identifier, generic_args: Vec<TypeRef>) -> TypeRef {
        Rc::new(TypeKind::ModalState {
            path,
            state,
            generic_args,
        })
    }
}

/// Strip one layer of permission qualification.
#[must_use]
pub fn strip_perm(ty: &TypeRef) -> TypeRef {
    match &**ty {
        TypeKind::Perm { base, .. } => Rc::clone(base),
        _ => Rc::clone(ty),
    }
}

/// View a type as a safe pointer, looking through one permission layer.
#[must_use]
pub fn as_safe_ptr(ty: &TypeRef) -> Option<(TypeRef, Option<PtrState>)> {
    match &*strip_perm(ty) {
        TypeKind::Ptr { elem, state } => Some((Rc::clone(elem), *state)),
        _ => None,
    }
}

/// The state refinement of a safe-pointer type, if it is one.
#[must_use]
pub fn ptr_state_of(ty: &TypeRef) -> Option<PtrState> {
    as_safe_ptr(ty).and_then(|(_, state)| state)
}
