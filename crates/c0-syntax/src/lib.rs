//! The parsed AST of Cursive 0.
//!
//! The parser (an external collaborator) produces these trees; the
//! analysis crates rewrite them functionally, so subtrees are shared via
//! `Rc` and every node carries its source span. Tagged variants are plain
//! Rust enums dispatched by `match`.

pub mod ident;
pub use ident::{Identifier, ModulePath, Path, PathKey, path_eq, path_key, split_last, string_of_path};

pub mod types;
pub use types::{
    BytesState, ClassPath, FuncTypeParam, Permission, PrimType, PtrState, RawPtrQual, StringState,
    Type, TypeNode, TypePath,
};

pub mod expr;
pub use expr::{
    ApplyArgs, Arg, BinaryOp, Block, ElseArm, EnumPayload, Expr, ExprNode, ExprPtr, FieldInit, Lit,
    MatchArm, Stmt, UnaryOp,
};

pub mod pattern;
pub use pattern::{
    EnumPayloadPattern, FieldPattern, ModalFieldsPattern, Pattern, PatternNode, pat_names,
};

pub mod item;
pub use item::{
    AbstractStateDecl, AssociatedTypeDecl, AstModule, Binding, ClassDecl, ClassFieldDecl,
    ClassItem, ClassMethodDecl, EnumDecl, EnumVariant, ErrorItem, FieldDecl, Item, MethodDecl,
    ModalDecl, Param, ParamMode, ProcedureDecl, Receiver, ReceiverPerm, RecordDecl, RecordMember,
    StateBlock, StateFieldDecl, StateMember, StateMethodDecl, StaticDecl, TransitionDecl,
    TypeAliasDecl, TypeParam, UsingClause, UsingDecl, UsingSpec, VariantPayload, Visibility,
    full_type_path, item_span, item_visibility,
};
