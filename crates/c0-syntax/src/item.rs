//! Top-level items and module structure.

use std::rc::Rc;

use c0_common::Span;
use serde::{Deserialize, Serialize};

use crate::expr::{Block, ExprPtr};
use crate::ident::{Identifier, ModulePath};
use crate::pattern::Pattern;
use crate::types::{ClassPath, Permission, Type, TypePath};

/// Item visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
    Private,
    Protected,
}

/// A parsed module: path, ordered items, source span.
/// Immutable after parse; resolution produces a parallel module.
#[derive(Clone, Debug)]
pub struct AstModule {
    pub path: ModulePath,
    pub items: Vec<Item>,
    pub span: Span,
}

/// A generic type parameter.
#[derive(Clone, Debug)]
pub struct TypeParam {
    pub name: Identifier,
    pub span: Span,
}

/// Parameter passing mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamMode {
    Value,
    Move,
}

/// A procedure or method parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: Identifier,
    pub mode: ParamMode,
    pub ty: Rc<Type>,
    pub span: Span,
}

/// Receiver form of a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiverPerm {
    /// `self` by value; never vtable-eligible.
    Value,
    Const,
    Unique,
    Shared,
}

/// A method receiver.
#[derive(Clone, Debug)]
pub struct Receiver {
    pub perm: ReceiverPerm,
    pub span: Span,
}

/// A pattern binding with optional annotation and initializer.
#[derive(Clone, Debug)]
pub struct Binding {
    pub pat: Pattern,
    pub ty: Option<Rc<Type>>,
    pub init: ExprPtr,
}

/// One `(name, alias?)` entry of a using list.
#[derive(Clone, Debug)]
pub struct UsingSpec {
    pub name: Identifier,
    pub alias: Option<Identifier>,
    pub span: Span,
}

/// The three using-clause forms.
#[derive(Clone, Debug)]
pub enum UsingClause {
    /// `using a::b (as c)?`, naming an item or a module.
    Path {
        path: ModulePath,
        alias: Option<Identifier>,
    },
    /// `using a::*`.
    Wildcard { module: ModulePath },
    /// `using a::{x, y as z, self}`.
    List {
        module: ModulePath,
        specs: Vec<UsingSpec>,
    },
}

#[derive(Clone, Debug)]
pub struct UsingDecl {
    pub vis: Visibility,
    pub clause: UsingClause,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StaticDecl {
    pub vis: Visibility,
    pub binding: Binding,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ProcedureDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub params: Vec<Param>,
    pub ret: Option<Rc<Type>>,
    pub body: Option<Rc<Block>>,
    pub span: Span,
}

/// A record or state field.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub ty: Rc<Type>,
    pub init: Option<ExprPtr>,
    pub span: Span,
}

/// A concrete method on a record or enum.
#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub receiver: Receiver,
    pub params: Vec<Param>,
    pub ret: Option<Rc<Type>>,
    pub body: Option<Rc<Block>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum RecordMember {
    Field(FieldDecl),
    Method(MethodDecl),
}

#[derive(Clone, Debug)]
pub struct RecordDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub generics: Vec<TypeParam>,
    pub implements: Vec<ClassPath>,
    pub members: Vec<RecordMember>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum VariantPayload {
    Tuple(Vec<Rc<Type>>),
    Record(Vec<FieldDecl>),
}

#[derive(Clone, Debug)]
pub struct EnumVariant {
    pub name: Identifier,
    pub payload: Option<VariantPayload>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub generics: Vec<TypeParam>,
    pub implements: Vec<ClassPath>,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

/// A field inside a modal state block.
#[derive(Clone, Debug)]
pub struct StateFieldDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub ty: Rc<Type>,
    pub span: Span,
}

/// A method available in one modal state. Calling it preserves the state.
#[derive(Clone, Debug)]
pub struct StateMethodDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub receiver_perm: Permission,
    pub params: Vec<Param>,
    pub ret: Option<Rc<Type>>,
    pub body: Option<Rc<Block>>,
    pub span: Span,
}

/// A transition: rewrites the instance to `target_state`.
#[derive(Clone, Debug)]
pub struct TransitionDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub params: Vec<Param>,
    pub target_state: Identifier,
    pub body: Option<Rc<Block>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StateMember {
    Field(StateFieldDecl),
    Method(StateMethodDecl),
    Transition(TransitionDecl),
}

/// One state block of a modal declaration.
#[derive(Clone, Debug)]
pub struct StateBlock {
    pub name: Identifier,
    pub members: Vec<StateMember>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ModalDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub generics: Vec<TypeParam>,
    pub implements: Vec<ClassPath>,
    pub states: Vec<StateBlock>,
    pub span: Span,
}

/// A class method, abstract (no body) or concrete.
#[derive(Clone, Debug)]
pub struct ClassMethodDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub receiver: Option<Receiver>,
    pub generics: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub ret: Option<Rc<Type>>,
    pub body: Option<Rc<Block>>,
    /// Excluded from dispatchability analysis; callable only statically.
    pub static_dispatch_only: bool,
    pub span: Span,
}

/// An abstract field requirement.
#[derive(Clone, Debug)]
pub struct ClassFieldDecl {
    pub name: Identifier,
    pub ty: Rc<Type>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct AssociatedTypeDecl {
    pub name: Identifier,
    pub span: Span,
}

/// An abstract state requirement for modal classes.
#[derive(Clone, Debug)]
pub struct AbstractStateDecl {
    pub name: Identifier,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ClassItem {
    Method(ClassMethodDecl),
    Field(ClassFieldDecl),
    AssociatedType(AssociatedTypeDecl),
    AbstractState(AbstractStateDecl),
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub generics: Vec<TypeParam>,
    pub supers: Vec<ClassPath>,
    pub items: Vec<ClassItem>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeAliasDecl {
    pub vis: Visibility,
    pub name: Identifier,
    pub generics: Vec<TypeParam>,
    pub ty: Rc<Type>,
    pub span: Span,
}

/// Parse-error placeholder: traversed but never binds names.
#[derive(Clone, Debug)]
pub struct ErrorItem {
    pub span: Span,
}

/// The top-level item variants.
#[derive(Clone, Debug)]
pub enum Item {
    Using(UsingDecl),
    Static(StaticDecl),
    Procedure(ProcedureDecl),
    Record(RecordDecl),
    Enum(EnumDecl),
    Modal(ModalDecl),
    Class(ClassDecl),
    TypeAlias(TypeAliasDecl),
    Error(ErrorItem),
}

/// Visibility of an item; `None` for error placeholders.
#[must_use]
pub fn item_visibility(item: &Item) -> Option<Visibility> {
    match item {
        Item::Using(decl) => Some(decl.vis),
        Item::Static(decl) => Some(decl.vis),
        Item::Procedure(decl) => Some(decl.vis),
        Item::Record(decl) => Some(decl.vis),
        Item::Enum(decl) => Some(decl.vis),
        Item::Modal(decl) => Some(decl.vis),
        Item::Class(decl) => Some(decl.vis),
        Item::TypeAlias(decl) => Some(decl.vis),
        Item::Error(_) => None,
    }
}

/// Source span of an item.
#[must_use]
pub fn item_span(item: &Item) -> Span {
    match item {
        Item::Using(decl) => decl.span,
        Item::Static(decl) => decl.span,
        Item::Procedure(decl) => decl.span,
        Item::Record(decl) => decl.span,
        Item::Enum(decl) => decl.span,
        Item::Modal(decl) => decl.span,
        Item::Class(decl) => decl.span,
        Item::TypeAlias(decl) => decl.span,
        Item::Error(item) => item.span,
    }
}

/// `TypePath` view of a modal or record declared in `module` as `name`.
#[must_use]
pub fn full_type_path(module: &ModulePath, name: Identifier) -> TypePath {
    let mut path: TypePath = module.iter().copied().collect();
    path.push(name);
    path
}
