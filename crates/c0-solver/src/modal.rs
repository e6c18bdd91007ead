//! The modal engine: state lookup, members, and transitions.
//!
//! A modal's interface is indexed by its state. State methods preserve
//! the state; transitions rewrite the instance to their target state.
//! Modal fields are never visible outside the declaring module.

use c0_syntax::{
    Identifier, ModalDecl, ModulePath, StateBlock, StateFieldDecl, StateMember, StateMethodDecl,
    TransitionDecl, TypePath, Visibility, path_eq,
};

use crate::types::{TypeKind, TypeRef};

/// The names of a modal's states, in declaration order. The set is
/// closed: no instance can carry any other state.
#[must_use]
pub fn modal_state_names(decl: &ModalDecl) -> Vec<Identifier> {
    decl.states.iter().map(|state| state.name).collect()
}

/// Find a state block by name.
#[must_use]
pub fn lookup_modal_state<'d>(decl: &'d ModalDecl, state: Identifier) -> Option<&'d StateBlock> {
    decl.states.iter().find(|block| block.name == state)
}

/// Find a state method by state and name.
#[must_use]
pub fn lookup_state_method_decl<'d>(
    decl: &'d ModalDecl,
    state: Identifier,
    name: Identifier,
) -> Option<&'d StateMethodDecl> {
    lookup_modal_state(decl, state)?
        .members
        .iter()
        .find_map(|member| match member {
            StateMember::Method(method) if method.name == name => Some(method),
            _ => None,
        })
}

/// Find a transition by state and name.
#[must_use]
pub fn lookup_transition_decl<'d>(
    decl: &'d ModalDecl,
    state: Identifier,
    name: Identifier,
) -> Option<&'d TransitionDecl> {
    lookup_modal_state(decl, state)?
        .members
        .iter()
        .find_map(|member| match member {
            StateMember::Transition(transition) if transition.name == name => Some(transition),
            _ => None,
        })
}

/// Find a state field by state and name.
#[must_use]
pub fn lookup_modal_field_decl<'d>(
    decl: &'d ModalDecl,
    state: Identifier,
    name: Identifier,
) -> Option<&'d StateFieldDecl> {
    lookup_modal_state(decl, state)?
        .members
        .iter()
        .find_map(|member| match member {
            StateMember::Field(field) if field.name == name => Some(field),
            _ => None,
        })
}

fn module_of_modal_path(path: &TypePath) -> &[Identifier] {
    if path.len() <= 1 {
        &[]
    } else {
        &path[..path.len() - 1]
    }
}

/// Modal fields are accessible only from the declaring module.
#[must_use]
pub fn modal_field_visible(current_module: &ModulePath, modal_path: &TypePath) -> bool {
    path_eq(module_of_modal_path(modal_path), current_module)
}

/// Whether a state member with the given visibility is accessible from
/// `current_module`.
#[must_use]
pub fn state_member_visible(
    current_module: &ModulePath,
    modal_path: &TypePath,
    vis: Visibility,
) -> bool {
    match vis {
        Visibility::Public | Visibility::Internal => true,
        Visibility::Private | Visibility::Protected => {
            path_eq(module_of_modal_path(modal_path), current_module)
        }
    }
}

/// The type a transition call produces: the modal refined by the
/// transition's target state.
#[must_use]
pub fn transition_result_type(
    modal_path: &TypePath,
    transition: &TransitionDecl,
    generic_args: Vec<TypeRef>,
) -> TypeRef {
    TypeKind::modal_state(modal_path.clone(), transition.target_state, generic_args)
}
