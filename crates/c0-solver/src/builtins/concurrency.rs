//! Concurrency and async built-ins.
//!
//! `ExecutionDomain` heads a small class hierarchy (`CpuDomain`,
//! `GpuDomain`, `InlineDomain`); `Spawned`, `Tracked`, `CancelToken`, and
//! `Async` are modals; the async aliases (`Sequence`, `Future`, `Stream`,
//! `Pipe`, `Exchange`) lower onto `Async` instantiations.

use std::rc::Rc;

use c0_binder::{Sigma, TypeDecl};
use c0_common::{Interner, Span};
use c0_syntax::types::{Permission, PrimType, Type, TypeNode};
use c0_syntax::{Identifier, ReceiverPerm, TypeAliasDecl, TypeParam, Visibility, path_key};

use crate::types::{TypeKind, TypeRef};

use super::{class, class_method, modal, state, state_method, transition, ty, unit_ty};

fn generic_param_ty(interner: &Interner, name: &str) -> Rc<Type> {
    ty(TypeNode::Path {
        path: vec![interner.intern(name)],
        generic_args: Vec::new(),
    })
}

fn async_alias(
    interner: &Interner,
    name: &str,
    generics: &[&str],
    async_args: &[&str],
) -> TypeAliasDecl {
    // `!` and `()` stand in for the unused async slots.
    let arg_ty = |slot: &str| match slot {
        "!" => ty(TypeNode::Prim(PrimType::Never)),
        "()" => ty(TypeNode::Prim(PrimType::Unit)),
        other => generic_param_ty(interner, other),
    };
    TypeAliasDecl {
        vis: Visibility::Public,
        name: interner.intern(name),
        generics: generics
            .iter()
            .map(|g| TypeParam {
                name: interner.intern(g),
                span: Span::dummy(),
            })
            .collect(),
        ty: ty(TypeNode::Path {
            path: vec![interner.intern("Async")],
            generic_args: async_args.iter().map(|slot| arg_ty(slot)).collect(),
        }),
        span: Span::dummy(),
    }
}

/// Install the concurrency surface into Σ.
pub(super) fn populate(interner: &Interner, sigma: &mut Sigma) {
    // Domain class hierarchy.
    let domain = class(
        interner,
        "ExecutionDomain",
        &[],
        vec![class_method(
            interner,
            "shutdown",
            ReceiverPerm::Shared,
            Vec::new(),
            Some(unit_ty()),
        )],
    );
    sigma.classes.insert(path_key(&[domain.name]), domain);
    for name in ["CpuDomain", "GpuDomain", "InlineDomain"] {
        let sub = class(interner, name, &["ExecutionDomain"], Vec::new());
        sigma.classes.insert(path_key(&[sub.name]), sub);
    }

    // Spawned<T>: a task handle that is joined exactly once.
    let spawned = modal(
        interner,
        "Spawned",
        &["T"],
        vec![
            state(
                interner,
                "Running",
                vec![
                    state_method(
                        interner,
                        "is_done",
                        Permission::Const,
                        Vec::new(),
                        Some(ty(TypeNode::Prim(PrimType::Bool))),
                    ),
                    transition(interner, "join", Vec::new(), "Done"),
                ],
            ),
            state(
                interner,
                "Done",
                vec![state_method(
                    interner,
                    "value",
                    Permission::Unique,
                    Vec::new(),
                    Some(generic_param_ty(interner, "T")),
                )],
            ),
        ],
    );
    sigma
        .types
        .insert(path_key(&[spawned.name]), TypeDecl::Modal(spawned));

    // Tracked<T, E>: a supervised task that can fail.
    let tracked = modal(
        interner,
        "Tracked",
        &["T", "E"],
        vec![
            state(
                interner,
                "Running",
                vec![transition(interner, "join", Vec::new(), "Done")],
            ),
            state(
                interner,
                "Done",
                vec![state_method(
                    interner,
                    "value",
                    Permission::Unique,
                    Vec::new(),
                    Some(generic_param_ty(interner, "T")),
                )],
            ),
            state(
                interner,
                "Failed",
                vec![state_method(
                    interner,
                    "error",
                    Permission::Unique,
                    Vec::new(),
                    Some(generic_param_ty(interner, "E")),
                )],
            ),
        ],
    );
    sigma
        .types
        .insert(path_key(&[tracked.name]), TypeDecl::Modal(tracked));

    // CancelToken: armed until cancelled, then permanently cancelled.
    let cancel_token = modal(
        interner,
        "CancelToken",
        &[],
        vec![
            state(
                interner,
                "Armed",
                vec![
                    state_method(
                        interner,
                        "is_cancelled",
                        Permission::Const,
                        Vec::new(),
                        Some(ty(TypeNode::Prim(PrimType::Bool))),
                    ),
                    transition(interner, "cancel", Vec::new(), "Cancelled"),
                ],
            ),
            state(
                interner,
                "Cancelled",
                vec![state_method(
                    interner,
                    "is_cancelled",
                    Permission::Const,
                    Vec::new(),
                    Some(ty(TypeNode::Prim(PrimType::Bool))),
                )],
            ),
        ],
    );
    sigma
        .types
        .insert(path_key(&[cancel_token.name]), TypeDecl::Modal(cancel_token));

    // Async<Out, In, Result, E>: the coroutine spine.
    let async_modal = modal(
        interner,
        "Async",
        &["Out", "In", "Result", "E"],
        vec![
            state(
                interner,
                "Suspended",
                vec![transition(
                    interner,
                    "resume",
                    vec![super::param(interner, "input", generic_param_ty(interner, "In"))],
                    "Suspended",
                )],
            ),
            state(
                interner,
                "Completed",
                vec![state_method(
                    interner,
                    "result",
                    Permission::Unique,
                    Vec::new(),
                    Some(generic_param_ty(interner, "Result")),
                )],
            ),
            state(
                interner,
                "Failed",
                vec![state_method(
                    interner,
                    "error",
                    Permission::Unique,
                    Vec::new(),
                    Some(generic_param_ty(interner, "E")),
                )],
            ),
        ],
    );
    sigma
        .types
        .insert(path_key(&[async_modal.name]), TypeDecl::Modal(async_modal));

    // Async aliases.
    for alias in [
        async_alias(interner, "Sequence", &["T"], &["T", "()", "()", "!"]),
        async_alias(interner, "Future", &["T", "E"], &["!", "()", "T", "E"]),
        async_alias(interner, "Stream", &["T", "E"], &["T", "()", "()", "E"]),
        async_alias(interner, "Pipe", &["In", "Out"], &["Out", "In", "()", "!"]),
        async_alias(interner, "Exchange", &["T"], &["T", "T", "()", "!"]),
    ] {
        sigma
            .types
            .insert(path_key(&[alias.name]), TypeDecl::Alias(alias));
    }
}

fn single_segment_named(interner: &Interner, path: &[Identifier], names: &[&str]) -> bool {
    if path.len() != 1 {
        return false;
    }
    let text = interner.resolve(path[0]);
    names.contains(&&*text)
}

/// Whether a type path names an execution domain (the class or any
/// built-in subclass).
#[must_use]
pub fn is_execution_domain_type_path(interner: &Interner, path: &[Identifier]) -> bool {
    single_segment_named(
        interner,
        path,
        &["ExecutionDomain", "CpuDomain", "GpuDomain", "InlineDomain"],
    )
}

#[must_use]
pub fn is_spawned_type_path(interner: &Interner, path: &[Identifier]) -> bool {
    single_segment_named(interner, path, &["Spawned"])
}

#[must_use]
pub fn is_tracked_type_path(interner: &Interner, path: &[Identifier]) -> bool {
    single_segment_named(interner, path, &["Tracked"])
}

#[must_use]
pub fn is_cancel_token_type_path(interner: &Interner, path: &[Identifier]) -> bool {
    single_segment_named(interner, path, &["CancelToken"])
}

#[must_use]
pub fn is_async_type_path(interner: &Interner, path: &[Identifier]) -> bool {
    single_segment_named(interner, path, &["Async"])
}

#[must_use]
pub fn is_valid_spawned_state(interner: &Interner, state: Identifier) -> bool {
    matches!(&*interner.resolve(state), "Running" | "Done")
}

#[must_use]
pub fn is_valid_tracked_state(interner: &Interner, state: Identifier) -> bool {
    matches!(&*interner.resolve(state), "Running" | "Done" | "Failed")
}

#[must_use]
pub fn is_valid_async_state(interner: &Interner, state: Identifier) -> bool {
    matches!(&*interner.resolve(state), "Suspended" | "Completed" | "Failed")
}

/// Signature of a `CancelToken` method in a given state (`None` means
/// any state that declares it).
#[must_use]
pub fn lookup_cancel_token_method_sig(
    interner: &Interner,
    name: Identifier,
    state: Option<Identifier>,
) -> Option<super::BuiltinMethodSig> {
    let in_state = |expected: &str| {
        state.is_none_or(|s| &*interner.resolve(s) == expected)
    };
    match &*interner.resolve(name) {
        "is_cancelled" if in_state("Armed") || in_state("Cancelled") => {
            Some(super::BuiltinMethodSig {
                receiver_perm: Permission::Const,
                params: Vec::new(),
                ret: TypeKind::prim(PrimType::Bool),
                target_state: None,
            })
        }
        "cancel" if in_state("Armed") => Some(super::BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: Vec::new(),
            ret: TypeKind::unit(),
            target_state: Some("Cancelled"),
        }),
        _ => None,
    }
}

/// Signature of an `ExecutionDomain` class method.
#[must_use]
pub fn lookup_execution_domain_method_sig(
    interner: &Interner,
    name: Identifier,
) -> Option<(Permission, TypeRef)> {
    match &*interner.resolve(name) {
        "shutdown" => Some((Permission::Shared, TypeKind::unit())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_predicate_covers_the_hierarchy() {
        let interner = Interner::new();
        for name in ["ExecutionDomain", "CpuDomain", "GpuDomain", "InlineDomain"] {
            assert!(is_execution_domain_type_path(
                &interner,
                &[interner.intern(name)]
            ));
        }
        assert!(!is_execution_domain_type_path(
            &interner,
            &[interner.intern("Spawned")]
        ));
    }

    #[test]
    fn state_sets_are_closed() {
        let interner = Interner::new();
        assert!(is_valid_spawned_state(&interner, interner.intern("Running")));
        assert!(!is_valid_spawned_state(&interner, interner.intern("Failed")));
        assert!(is_valid_async_state(&interner, interner.intern("Suspended")));
        assert!(!is_valid_async_state(&interner, interner.intern("Running")));
    }

    #[test]
    fn cancel_token_signatures_are_state_indexed() {
        let interner = Interner::new();
        let cancel = interner.intern("cancel");
        let armed = interner.intern("Armed");
        let cancelled = interner.intern("Cancelled");
        assert!(lookup_cancel_token_method_sig(&interner, cancel, Some(armed)).is_some());
        assert!(lookup_cancel_token_method_sig(&interner, cancel, Some(cancelled)).is_none());
        let sig = lookup_cancel_token_method_sig(&interner, cancel, None).unwrap();
        assert_eq!(sig.target_state, Some("Cancelled"));
    }
}
