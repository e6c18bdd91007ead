//! Runtime library validation.
//!
//! The linker input list must include `runtime/cursive0_rt.lib`, and the
//! archive must export a fixed symbol set: the panic entry, region
//! operations, string/bytes builtins, fs/heap methods, and context
//! initialization. A missing file is `E-OUT-0407`; each absent symbol is
//! `E-OUT-0408`.

use std::path::{Path, PathBuf};

use c0_common::host::{HostPrim, host_prim_fail};
use c0_common::{DiagnosticStream, make_diagnostic, make_diagnostic_with};

/// Mangled symbols the runtime must provide.
pub const REQUIRED_RUNTIME_SYMBOLS: &[&str] = &[
    "cursive$runtime$panic",
    "cursive$runtime$region_enter",
    "cursive$runtime$region_exit",
    "cursive$runtime$region_alloc",
    "cursive$runtime$frame_enter",
    "cursive$runtime$frame_exit",
    "cursive$runtime$string_from",
    "cursive$runtime$string_append",
    "cursive$runtime$bytes_from_slice",
    "cursive$runtime$bytes_append",
    "cursive$runtime$fs_open",
    "cursive$runtime$fs_read_all",
    "cursive$runtime$fs_write",
    "cursive$runtime$heap_alloc",
    "cursive$runtime$heap_free",
    "cursive$runtime$context_init",
];

/// Where the runtime library lives, relative to the project root.
#[must_use]
pub fn runtime_library_path(project_root: &Path) -> PathBuf {
    project_root.join("runtime").join("cursive0_rt.lib")
}

/// Check the runtime archive's presence and exported symbols.
/// `exported_symbols` comes from the archive reader shim.
#[must_use]
pub fn check_runtime_library(
    project_root: &Path,
    exported_symbols: Option<&[String]>,
) -> DiagnosticStream {
    let mut diags = DiagnosticStream::new();
    let lib_path = runtime_library_path(project_root);

    if !lib_path.exists() {
        host_prim_fail(HostPrim::ResolveRuntimeLib, true);
        if let Some(diag) = make_diagnostic("E-OUT-0407", None) {
            diags.push(diag);
        }
        return diags;
    }

    let Some(symbols) = exported_symbols else {
        return diags;
    };
    for required in REQUIRED_RUNTIME_SYMBOLS {
        if !symbols.iter().any(|symbol| symbol == required) {
            if let Some(diag) = make_diagnostic_with("E-OUT-0408", None, &[("symbol", required)]) {
                diags.push(diag);
            }
        }
    }
    diags
}
