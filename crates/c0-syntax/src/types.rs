//! Syntactic types.
//!
//! These are the types as written in source. Lowering to resolved
//! `TypeRef`s lives in the solver; the resolver only rewrites the paths
//! inside these nodes.

use std::rc::Rc;

use c0_common::Span;
use serde::{Deserialize, Serialize};

use crate::expr::ExprPtr;
use crate::ident::Identifier;

/// A nominal type reference as written: module segments plus type name.
pub type TypePath = Vec<Identifier>;

/// A class reference as written.
pub type ClassPath = Vec<Identifier>;

/// Built-in scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimType {
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    Isize,
    Usize,
    F16,
    F32,
    F64,
    Bool,
    Char,
    /// `()`
    Unit,
    /// `!`
    Never,
}

impl PrimType {
    /// Source-level name of the primitive.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimType::I8 => "i8",
            PrimType::I16 => "i16",
            PrimType::I32 => "i32",
            PrimType::I64 => "i64",
            PrimType::I128 => "i128",
            PrimType::U8 => "u8",
            PrimType::U16 => "u16",
            PrimType::U32 => "u32",
            PrimType::U64 => "u64",
            PrimType::U128 => "u128",
            PrimType::Isize => "isize",
            PrimType::Usize => "usize",
            PrimType::F16 => "f16",
            PrimType::F32 => "f32",
            PrimType::F64 => "f64",
            PrimType::Bool => "bool",
            PrimType::Char => "char",
            PrimType::Unit => "()",
            PrimType::Never => "!",
        }
    }

    /// All primitives, in declaration order.
    pub const ALL: &'static [PrimType] = &[
        PrimType::I8,
        PrimType::I16,
        PrimType::I32,
        PrimType::I64,
        PrimType::I128,
        PrimType::U8,
        PrimType::U16,
        PrimType::U32,
        PrimType::U64,
        PrimType::U128,
        PrimType::Isize,
        PrimType::Usize,
        PrimType::F16,
        PrimType::F32,
        PrimType::F64,
        PrimType::Bool,
        PrimType::Char,
        PrimType::Unit,
        PrimType::Never,
    ];
}

/// Permission qualifier on a whole type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Const,
    Unique,
    Shared,
}

/// Safe-pointer state refinement. The state set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PtrState {
    Valid,
    Null,
    Expired,
}

/// Raw pointer mutability qualifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawPtrQual {
    Imm,
    Mut,
}

/// `string` representation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringState {
    Managed,
    View,
}

/// `bytes` representation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BytesState {
    Managed,
    View,
}

/// Parameter of a function type.
#[derive(Clone, Debug)]
pub struct FuncTypeParam {
    pub ty: Rc<Type>,
    pub span: Span,
}

/// A syntactic type with its source span.
#[derive(Clone, Debug)]
pub struct Type {
    pub node: TypeNode,
    pub span: Span,
}

impl Type {
    #[must_use]
    pub fn new(node: TypeNode, span: Span) -> Rc<Self> {
        Rc::new(Type { node, span })
    }
}

/// The syntactic type variants.
#[derive(Clone, Debug)]
pub enum TypeNode {
    /// A built-in scalar.
    Prim(PrimType),
    /// Nominal reference with optional generic arguments.
    Path {
        path: TypePath,
        generic_args: Vec<Rc<Type>>,
    },
    /// `perm T`.
    Perm { perm: Permission, base: Rc<Type> },
    Tuple(Vec<Rc<Type>>),
    /// `[T; len]` with a const length expression.
    Array { elem: Rc<Type>, len: ExprPtr },
    /// `[T]`.
    Slice(Rc<Type>),
    /// Structural sum; members de-duplicated, order-insensitive.
    Union(Vec<Rc<Type>>),
    /// First-class function type.
    Func {
        params: Vec<FuncTypeParam>,
        ret: Rc<Type>,
    },
    /// `Ptr<T>` with optional state refinement.
    Ptr {
        elem: Rc<Type>,
        state: Option<PtrState>,
    },
    /// Unsafe pointer.
    RawPtr { qual: RawPtrQual, elem: Rc<Type> },
    /// `string`, optionally state-refined.
    String(Option<StringState>),
    /// `bytes`, optionally state-refined.
    Bytes(Option<BytesState>),
    /// Type-erased class instance.
    Dynamic(ClassPath),
    /// Modal nominal refined by a state name.
    ModalState {
        path: TypePath,
        state: Identifier,
        generic_args: Vec<Rc<Type>>,
    },
    /// Dependent refinement over a base type.
    Refine { base: Rc<Type>, pred: ExprPtr },
    /// `Self` inside class and modal bodies.
    SelfType,
    /// Placeholder produced for unparseable types.
    Error,
}
