//! Filesystem capability built-ins.
//!
//! `File` and `DirIter` are modals whose interfaces shrink to nothing in
//! their `Closed` states; `DirEntry`, `FileKind`, and `IoError` carry the
//! results. `System` and `Context` hold the capability handles user code
//! threads through.

use c0_binder::{Sigma, TypeDecl};
use c0_common::Interner;
use c0_syntax::types::{BytesState, Permission, StringState, TypeNode};
use c0_syntax::{Identifier, path_key};

use crate::types::{FuncParamSig, TypeKind, TypeRef};

use super::{modal, param, record, state, state_method, transition, ty, union_ty, unit_enum, unit_ty};

/// A built-in method signature: receiver permission, parameters, return
/// type, and the target state when the method is a transition.
#[derive(Clone, Debug)]
pub struct BuiltinMethodSig {
    pub receiver_perm: Permission,
    pub params: Vec<FuncParamSig>,
    pub ret: TypeRef,
    pub target_state: Option<&'static str>,
}

fn bytes_managed() -> TypeRef {
    std::rc::Rc::new(TypeKind::Bytes(Some(BytesState::Managed)))
}

fn bytes_view() -> TypeRef {
    std::rc::Rc::new(TypeKind::Bytes(Some(BytesState::View)))
}

fn io_error(interner: &Interner) -> TypeRef {
    TypeKind::path(vec![interner.intern("IoError")])
}

fn dir_entry(interner: &Interner) -> TypeRef {
    TypeKind::path(vec![interner.intern("DirEntry")])
}

fn result_or_io(interner: &Interner, ok: TypeRef) -> TypeRef {
    crate::union::union_introduce(vec![ok, io_error(interner)])
}

fn value_param(ty: TypeRef) -> FuncParamSig {
    FuncParamSig {
        mode: c0_syntax::ParamMode::Value,
        ty,
    }
}

/// Install the filesystem types into Σ.
pub(super) fn populate(interner: &Interner, sigma: &mut Sigma) {
    let bytes_view_syntax = ty(TypeNode::Bytes(Some(BytesState::View)));
    let bytes_managed_syntax = ty(TypeNode::Bytes(Some(BytesState::Managed)));
    let io_error_syntax = super::path_ty(interner, "IoError");
    let dir_entry_syntax = super::path_ty(interner, "DirEntry");

    let file = modal(
        interner,
        "File",
        &[],
        vec![
            state(
                interner,
                "Read",
                vec![
                    state_method(
                        interner,
                        "read_all",
                        Permission::Unique,
                        Vec::new(),
                        Some(union_ty(vec![
                            bytes_managed_syntax.clone(),
                            io_error_syntax.clone(),
                        ])),
                    ),
                    transition(interner, "close", Vec::new(), "Closed"),
                ],
            ),
            state(
                interner,
                "Write",
                vec![
                    state_method(
                        interner,
                        "write",
                        Permission::Unique,
                        vec![param(interner, "data", bytes_view_syntax.clone())],
                        Some(union_ty(vec![unit_ty(), io_error_syntax.clone()])),
                    ),
                    state_method(
                        interner,
                        "flush",
                        Permission::Unique,
                        Vec::new(),
                        Some(union_ty(vec![unit_ty(), io_error_syntax.clone()])),
                    ),
                    transition(interner, "close", Vec::new(), "Closed"),
                ],
            ),
            state(
                interner,
                "Append",
                vec![
                    state_method(
                        interner,
                        "write",
                        Permission::Unique,
                        vec![param(interner, "data", bytes_view_syntax)],
                        Some(union_ty(vec![unit_ty(), io_error_syntax.clone()])),
                    ),
                    state_method(
                        interner,
                        "flush",
                        Permission::Unique,
                        Vec::new(),
                        Some(union_ty(vec![unit_ty(), io_error_syntax.clone()])),
                    ),
                    transition(interner, "close", Vec::new(), "Closed"),
                ],
            ),
            state(interner, "Closed", Vec::new()),
        ],
    );
    sigma
        .types
        .insert(path_key(&[file.name]), TypeDecl::Modal(file));

    let dir_iter = modal(
        interner,
        "DirIter",
        &[],
        vec![
            state(
                interner,
                "Open",
                vec![
                    state_method(
                        interner,
                        "next",
                        Permission::Unique,
                        Vec::new(),
                        Some(union_ty(vec![
                            dir_entry_syntax,
                            unit_ty(),
                            io_error_syntax,
                        ])),
                    ),
                    transition(interner, "close", Vec::new(), "Closed"),
                ],
            ),
            state(interner, "Closed", Vec::new()),
        ],
    );
    sigma
        .types
        .insert(path_key(&[dir_iter.name]), TypeDecl::Modal(dir_iter));

    let dir_entry_decl = record(
        interner,
        "DirEntry",
        vec![
            ("name", ty(TypeNode::String(Some(StringState::Managed)))),
            ("kind", super::path_ty(interner, "FileKind")),
        ],
    );
    sigma
        .types
        .insert(path_key(&[dir_entry_decl.name]), TypeDecl::Record(dir_entry_decl));

    let file_kind = unit_enum(interner, "FileKind", &["File", "Directory", "Symlink", "Other"]);
    sigma
        .types
        .insert(path_key(&[file_kind.name]), TypeDecl::Enum(file_kind));

    let io_error_decl = unit_enum(
        interner,
        "IoError",
        &[
            "NotFound",
            "PermissionDenied",
            "AlreadyExists",
            "InvalidData",
            "Interrupted",
            "UnexpectedEof",
            "Other",
        ],
    );
    sigma
        .types
        .insert(path_key(&[io_error_decl.name]), TypeDecl::Enum(io_error_decl));

    let allocation_error = unit_enum(interner, "AllocationError", &["OutOfMemory"]);
    sigma.types.insert(
        path_key(&[allocation_error.name]),
        TypeDecl::Enum(allocation_error),
    );

    let system = record(interner, "System", Vec::new());
    sigma
        .types
        .insert(path_key(&[system.name]), TypeDecl::Record(system));

    let context = record(
        interner,
        "Context",
        vec![("system", super::path_ty(interner, "System"))],
    );
    sigma
        .types
        .insert(path_key(&[context.name]), TypeDecl::Record(context));
}

/// Typed signatures for the `File`/`DirIter` methods, used by the
/// resolver and checker without re-walking the modal declarations.
#[must_use]
pub fn lookup_file_system_method_sig(
    interner: &Interner,
    name: Identifier,
) -> Option<BuiltinMethodSig> {
    let text = interner.resolve(name);
    let sig = match &*text {
        "read_all" => BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: Vec::new(),
            ret: result_or_io(interner, bytes_managed()),
            target_state: None,
        },
        "write" => BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: vec![value_param(bytes_view())],
            ret: result_or_io(interner, TypeKind::unit()),
            target_state: None,
        },
        "flush" => BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: Vec::new(),
            ret: result_or_io(interner, TypeKind::unit()),
            target_state: None,
        },
        "close" => BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: Vec::new(),
            ret: TypeKind::unit(),
            target_state: Some("Closed"),
        },
        "next" => BuiltinMethodSig {
            receiver_perm: Permission::Unique,
            params: Vec::new(),
            ret: crate::union::union_introduce(vec![
                dir_entry(interner),
                TypeKind::unit(),
                io_error(interner),
            ]),
            target_state: None,
        },
        _ => return None,
    };
    Some(sig)
}
