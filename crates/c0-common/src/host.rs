//! Host primitive taxonomy.
//!
//! Every surface through which the compiler touches the host is one of a
//! closed set of primitives. A primitive failure must map either to a
//! diagnostic or to runtime behavior; reporting a failure for a primitive
//! that maps to neither aborts the process, which keeps the diagnostic
//! surface total over failure modes.

use serde::Serialize;

/// The closed enumeration of host primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HostPrim {
    // Diagnostic-producing build primitives.
    ParseToml,
    ReadBytes,
    WriteFile,
    ResolveTool,
    ResolveRuntimeLib,
    Invoke,
    AssembleIr,
    InvokeLinker,

    // Filesystem capability surface.
    FsOpenRead,
    FsOpenWrite,
    FsOpenAppend,
    FsCreateWrite,
    FsReadFile,
    FsReadBytes,
    FsWriteFile,
    FsWriteStdout,
    FsWriteStderr,
    FsExists,
    FsRemove,
    FsOpenDir,
    FsCreateDir,
    FsEnsureDir,
    FsKind,
    FsRestrict,

    // File-handle operations.
    FileReadAll,
    FileReadAllBytes,
    FileWrite,
    FileFlush,
    FileClose,

    // Directory-iterator operations.
    DirNext,
    DirClose,
}

impl HostPrim {
    /// Every primitive, for totality checks in tests.
    pub const ALL: &'static [HostPrim] = &[
        HostPrim::ParseToml,
        HostPrim::ReadBytes,
        HostPrim::WriteFile,
        HostPrim::ResolveTool,
        HostPrim::ResolveRuntimeLib,
        HostPrim::Invoke,
        HostPrim::AssembleIr,
        HostPrim::InvokeLinker,
        HostPrim::FsOpenRead,
        HostPrim::FsOpenWrite,
        HostPrim::FsOpenAppend,
        HostPrim::FsCreateWrite,
        HostPrim::FsReadFile,
        HostPrim::FsReadBytes,
        HostPrim::FsWriteFile,
        HostPrim::FsWriteStdout,
        HostPrim::FsWriteStderr,
        HostPrim::FsExists,
        HostPrim::FsRemove,
        HostPrim::FsOpenDir,
        HostPrim::FsCreateDir,
        HostPrim::FsEnsureDir,
        HostPrim::FsKind,
        HostPrim::FsRestrict,
        HostPrim::FileReadAll,
        HostPrim::FileReadAllBytes,
        HostPrim::FileWrite,
        HostPrim::FileFlush,
        HostPrim::FileClose,
        HostPrim::DirNext,
        HostPrim::DirClose,
    ];
}

/// Filesystem capability primitives.
#[must_use]
pub fn is_fs_prim(prim: HostPrim) -> bool {
    matches!(
        prim,
        HostPrim::FsOpenRead
            | HostPrim::FsOpenWrite
            | HostPrim::FsOpenAppend
            | HostPrim::FsCreateWrite
            | HostPrim::FsReadFile
            | HostPrim::FsReadBytes
            | HostPrim::FsWriteFile
            | HostPrim::FsWriteStdout
            | HostPrim::FsWriteStderr
            | HostPrim::FsExists
            | HostPrim::FsRemove
            | HostPrim::FsOpenDir
            | HostPrim::FsCreateDir
            | HostPrim::FsEnsureDir
            | HostPrim::FsKind
            | HostPrim::FsRestrict
    )
}

/// File-handle primitives.
#[must_use]
pub fn is_file_prim(prim: HostPrim) -> bool {
    matches!(
        prim,
        HostPrim::FileReadAll
            | HostPrim::FileReadAllBytes
            | HostPrim::FileWrite
            | HostPrim::FileFlush
            | HostPrim::FileClose
    )
}

/// Directory-iterator primitives.
#[must_use]
pub fn is_dir_prim(prim: HostPrim) -> bool {
    matches!(prim, HostPrim::DirNext | HostPrim::DirClose)
}

/// Primitives whose failures surface as diagnostics.
#[must_use]
pub fn is_host_prim_diag(prim: HostPrim) -> bool {
    matches!(
        prim,
        HostPrim::ParseToml
            | HostPrim::ReadBytes
            | HostPrim::WriteFile
            | HostPrim::ResolveTool
            | HostPrim::ResolveRuntimeLib
            | HostPrim::Invoke
            | HostPrim::AssembleIr
            | HostPrim::InvokeLinker
    )
}

/// Primitives whose failures surface as runtime behavior.
#[must_use]
pub fn is_host_prim_runtime(prim: HostPrim) -> bool {
    is_fs_prim(prim) || is_file_prim(prim) || is_dir_prim(prim)
}

/// Totality predicate: every primitive maps somewhere.
#[must_use]
pub fn maps_to_diag_or_runtime(prim: HostPrim) -> bool {
    is_host_prim_diag(prim) || is_host_prim_runtime(prim)
}

/// Whether a reported failure falls outside the taxonomy.
#[must_use]
pub fn host_prim_failure_ill_formed(prim: HostPrim, failed: bool) -> bool {
    failed && !maps_to_diag_or_runtime(prim)
}

/// Register a primitive failure. Aborts the process if the failure is for
/// a primitive that maps to neither diagnostics nor runtime behavior.
pub fn host_prim_fail(prim: HostPrim, failed: bool) -> bool {
    if host_prim_failure_ill_formed(prim, failed) {
        std::process::abort();
    }
    failed
}
