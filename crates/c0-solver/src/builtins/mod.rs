//! Σ built-ins.
//!
//! Canonical declarations installed before user resolution: the
//! foundational classes (`Drop`, `Bitcopy`, `Clone`), the `Region` modal,
//! the filesystem capability types, the heap, and the concurrency/async
//! surface. Built-ins live at single-segment paths so the universe scope
//! resolves them directly.

use std::rc::Rc;

use c0_binder::{Sigma, TypeDecl};
use c0_common::{Interner, Span};
use c0_syntax::types::{Permission, PrimType, Type, TypeNode};
use c0_syntax::{
    AstModule, ClassDecl, ClassItem, ClassMethodDecl, Identifier, Item, ModalDecl, Param,
    ParamMode, Receiver, ReceiverPerm, RecordDecl, StateBlock, StateMember, StateMethodDecl,
    TransitionDecl, Visibility, path_key,
};

mod filesystem;
pub use filesystem::{BuiltinMethodSig, lookup_file_system_method_sig};

mod concurrency;
pub use concurrency::{
    is_async_type_path, is_cancel_token_type_path, is_execution_domain_type_path,
    is_spawned_type_path, is_tracked_type_path, is_valid_async_state, is_valid_spawned_state,
    is_valid_tracked_state, lookup_cancel_token_method_sig, lookup_execution_domain_method_sig,
};

mod strings;
pub use strings::{BuiltinFnSig, lookup_bytes_fn, lookup_string_fn};

pub(crate) fn ty(node: TypeNode) -> Rc<Type> {
    Type::new(node, Span::dummy())
}

pub(crate) fn unit_ty() -> Rc<Type> {
    ty(TypeNode::Prim(PrimType::Unit))
}

pub(crate) fn path_ty(interner: &Interner, name: &str) -> Rc<Type> {
    ty(TypeNode::Path {
        path: vec![interner.intern(name)],
        generic_args: Vec::new(),
    })
}

pub(crate) fn union_ty(members: Vec<Rc<Type>>) -> Rc<Type> {
    ty(TypeNode::Union(members))
}

pub(crate) fn param(interner: &Interner, name: &str, param_ty: Rc<Type>) -> Param {
    Param {
        name: interner.intern(name),
        mode: ParamMode::Value,
        ty: param_ty,
        span: Span::dummy(),
    }
}

pub(crate) fn state_method(
    interner: &Interner,
    name: &str,
    receiver_perm: Permission,
    params: Vec<Param>,
    ret: Option<Rc<Type>>,
) -> StateMember {
    StateMember::Method(StateMethodDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        receiver_perm,
        params,
        ret,
        body: None,
        span: Span::dummy(),
    })
}

pub(crate) fn transition(
    interner: &Interner,
    name: &str,
    params: Vec<Param>,
    target: &str,
) -> StateMember {
    StateMember::Transition(TransitionDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        params,
        target_state: interner.intern(target),
        body: None,
        span: Span::dummy(),
    })
}

pub(crate) fn state(interner: &Interner, name: &str, members: Vec<StateMember>) -> StateBlock {
    StateBlock {
        name: interner.intern(name),
        members,
        span: Span::dummy(),
    }
}

pub(crate) fn modal(
    interner: &Interner,
    name: &str,
    generics: &[&str],
    states: Vec<StateBlock>,
) -> ModalDecl {
    ModalDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: generics
            .iter()
            .map(|g| c0_syntax::TypeParam {
                name: interner.intern(g),
                span: Span::dummy(),
            })
            .collect(),
        implements: Vec::new(),
        states,
        span: Span::dummy(),
    }
}

pub(crate) fn record(interner: &Interner, name: &str, fields: Vec<(&str, Rc<Type>)>) -> RecordDecl {
    RecordDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: Vec::new(),
        implements: Vec::new(),
        members: fields
            .into_iter()
            .map(|(field_name, field_ty)| {
                c0_syntax::RecordMember::Field(c0_syntax::FieldDecl {
                    vis: Visibility::Public,
                    name: interner.intern(field_name),
                    ty: field_ty,
                    init: None,
                    span: Span::dummy(),
                })
            })
            .collect(),
        span: Span::dummy(),
    }
}

pub(crate) fn unit_enum(interner: &Interner, name: &str, variants: &[&str]) -> c0_syntax::EnumDecl {
    c0_syntax::EnumDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: Vec::new(),
        implements: Vec::new(),
        variants: variants
            .iter()
            .map(|variant| c0_syntax::EnumVariant {
                name: interner.intern(variant),
                payload: None,
                span: Span::dummy(),
            })
            .collect(),
        span: Span::dummy(),
    }
}

pub(crate) fn class_method(
    interner: &Interner,
    name: &str,
    receiver: ReceiverPerm,
    params: Vec<Param>,
    ret: Option<Rc<Type>>,
) -> ClassItem {
    ClassItem::Method(ClassMethodDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        receiver: Some(Receiver {
            perm: receiver,
            span: Span::dummy(),
        }),
        generics: Vec::new(),
        params,
        ret,
        body: None,
        static_dispatch_only: false,
        span: Span::dummy(),
    })
}

pub(crate) fn class(
    interner: &Interner,
    name: &str,
    supers: &[&str],
    items: Vec<ClassItem>,
) -> ClassDecl {
    ClassDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: Vec::new(),
        supers: supers.iter().map(|s| vec![interner.intern(s)]).collect(),
        items,
        span: Span::dummy(),
    }
}

fn insert_type(sigma: &mut Sigma, name: Identifier, decl: TypeDecl) {
    sigma.types.insert(path_key(&[name]), decl);
}

fn insert_class(sigma: &mut Sigma, decl: ClassDecl) {
    sigma.classes.insert(path_key(&[decl.name]), decl);
}

/// The `Region` modal: a scoped arena with deterministic exit.
fn region_modal(interner: &Interner) -> ModalDecl {
    let usize_ty = ty(TypeNode::Prim(PrimType::Usize));
    modal(
        interner,
        "Region",
        &[],
        vec![
            state(
                interner,
                "Active",
                vec![
                    state_method(interner, "used", Permission::Const, Vec::new(), Some(usize_ty.clone())),
                    state_method(
                        interner,
                        "capacity",
                        Permission::Const,
                        Vec::new(),
                        Some(usize_ty),
                    ),
                    transition(interner, "freeze", Vec::new(), "Frozen"),
                    transition(interner, "free", Vec::new(), "Freed"),
                ],
            ),
            state(
                interner,
                "Frozen",
                vec![
                    transition(interner, "thaw", Vec::new(), "Active"),
                    transition(interner, "free", Vec::new(), "Freed"),
                ],
            ),
            state(interner, "Freed", Vec::new()),
        ],
    )
}

/// Install the foundational classes and capability types into Σ.
pub fn populate_builtins(interner: &Interner, sigma: &mut Sigma) {
    // Foundational classes.
    let drop_class = class(
        interner,
        "Drop",
        &[],
        vec![class_method(
            interner,
            "drop",
            ReceiverPerm::Unique,
            Vec::new(),
            Some(unit_ty()),
        )],
    );
    insert_class(sigma, drop_class);
    insert_class(sigma, class(interner, "Bitcopy", &[], Vec::new()));
    let clone_class = class(
        interner,
        "Clone",
        &[],
        vec![class_method(
            interner,
            "clone",
            ReceiverPerm::Const,
            Vec::new(),
            Some(ty(TypeNode::SelfType)),
        )],
    );
    insert_class(sigma, clone_class);

    // Memory.
    let region = region_modal(interner);
    insert_type(sigma, region.name, TypeDecl::Modal(region));
    let heap = record(interner, "Heap", Vec::new());
    insert_type(sigma, heap.name, TypeDecl::Record(heap));

    // Filesystem capability surface.
    filesystem::populate(interner, sigma);

    // Concurrency and async.
    concurrency::populate(interner, sigma);
}

/// Build Σ: built-ins first, then every module's declarations.
#[must_use]
pub fn populate_sigma(interner: &Interner, modules: Vec<AstModule>) -> Sigma {
    let mut sigma = Sigma::default();
    populate_builtins(interner, &mut sigma);

    for module in &modules {
        for item in &module.items {
            let mut full = module.path.clone();
            match item {
                Item::Record(decl) => {
                    full.push(decl.name);
                    sigma
                        .types
                        .insert(path_key(&full), TypeDecl::Record(decl.clone()));
                }
                Item::Enum(decl) => {
                    full.push(decl.name);
                    sigma
                        .types
                        .insert(path_key(&full), TypeDecl::Enum(decl.clone()));
                }
                Item::Modal(decl) => {
                    full.push(decl.name);
                    sigma
                        .types
                        .insert(path_key(&full), TypeDecl::Modal(decl.clone()));
                }
                Item::TypeAlias(decl) => {
                    full.push(decl.name);
                    sigma
                        .types
                        .insert(path_key(&full), TypeDecl::Alias(decl.clone()));
                }
                Item::Class(decl) => {
                    full.push(decl.name);
                    sigma.classes.insert(path_key(&full), decl.clone());
                }
                Item::Using(_) | Item::Static(_) | Item::Procedure(_) | Item::Error(_) => {}
            }
        }
    }

    sigma.mods = modules;
    sigma
}

#[cfg(test)]
#[path = "../tests/builtins.rs"]
mod tests;
