//! External tool resolution.
//!
//! Search order: `$C0_LLVM_BIN`, a repo-local LLVM distribution, then
//! `$PATH`. Windows adds `.exe` candidates and a version-descending MSVC
//! scan for `link.exe`; the scan is a heuristic, not a correctness
//! property.

use std::path::{Path, PathBuf};

use c0_common::host::{HostPrim, host_prim_fail};
use c0_common::{DiagnosticStream, make_diagnostic};
use tracing::debug;

const REPO_LLVM_BIN: &str = "llvm/llvm-21.1.8-x86_64/bin";

fn path_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}

fn split_path_list(path_list: &str) -> Vec<PathBuf> {
    path_list
        .split(path_separator())
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn repo_llvm_dir(project_root: &Path) -> Option<PathBuf> {
    let dir = project_root.join(REPO_LLVM_BIN);
    dir.is_dir().then_some(dir)
}

fn tool_candidates(tool: &str) -> Vec<String> {
    let mut out = vec![tool.to_string()];
    if cfg!(windows) && !tool.to_ascii_lowercase().ends_with(".exe") {
        out.push(format!("{tool}.exe"));
    }
    out
}

/// The directories searched, in priority order.
#[must_use]
pub fn search_dirs(project_root: &Path) -> Vec<PathBuf> {
    if let Ok(env) = std::env::var("C0_LLVM_BIN") {
        if !env.is_empty() {
            return vec![PathBuf::from(env)];
        }
    }
    if let Some(repo) = repo_llvm_dir(project_root) {
        return vec![repo];
    }
    match std::env::var("PATH") {
        Ok(path) if !path.is_empty() => split_path_list(&path),
        _ => Vec::new(),
    }
}

/// Windows-only deep scan for MSVC's `link.exe` under a VC Tools
/// install, newest version first.
#[cfg(windows)]
fn msvc_link_scan() -> Option<PathBuf> {
    let vs_root = PathBuf::from("C:/Program Files/Microsoft Visual Studio");
    let tools = |edition_dir: &Path| edition_dir.join("VC/Tools/MSVC");
    let mut versions: Vec<PathBuf> = Vec::new();
    for year in std::fs::read_dir(&vs_root).ok()?.flatten() {
        for edition in std::fs::read_dir(year.path()).ok().into_iter().flatten().flatten() {
            if let Ok(entries) = std::fs::read_dir(tools(&edition.path())) {
                versions.extend(entries.flatten().map(|e| e.path()));
            }
        }
    }
    versions.sort();
    versions
        .into_iter()
        .rev()
        .map(|version| version.join("bin/Hostx64/x64/link.exe"))
        .find(|candidate| candidate.exists())
}

/// Resolve a tool by name. On failure the missing-tool diagnostic is
/// returned alongside the `ResolveTool` host-primitive report.
pub fn resolve_tool(project_root: &Path, tool: &str) -> (Option<PathBuf>, DiagnosticStream) {
    let mut diags = DiagnosticStream::new();
    for dir in search_dirs(project_root) {
        for candidate in tool_candidates(tool) {
            let path = dir.join(&candidate);
            if path.exists() {
                debug!(tool, path = %path.display(), "tool resolved");
                return (Some(path), diags);
            }
        }
    }

    #[cfg(windows)]
    if tool == "link.exe" || tool == "link" {
        if let Some(found) = msvc_link_scan() {
            return (Some(found), diags);
        }
    }

    host_prim_fail(HostPrim::ResolveTool, true);
    if let Some(code) = missing_tool_code(tool) {
        if let Some(diag) = make_diagnostic(code, None) {
            diags.push(diag);
        }
    }
    (None, diags)
}

/// The diagnostic code for a missing required tool.
#[must_use]
pub fn missing_tool_code(tool: &str) -> Option<&'static str> {
    match tool {
        "llvm-as" => Some("E-OUT-0403"),
        "lld-link" => Some("E-OUT-0405"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_lists_split_on_the_platform_separator() {
        let list = if cfg!(windows) { "a;b;;c" } else { "a:b::c" };
        let dirs = split_path_list(list);
        assert_eq!(dirs.len(), 3);
        assert_eq!(dirs[0], PathBuf::from("a"));
    }

    #[test]
    fn unknown_tools_carry_no_missing_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (path, diags) = resolve_tool(dir.path(), "tool-definitely-not-installed");
        assert!(path.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn required_tools_map_to_their_codes() {
        assert_eq!(missing_tool_code("llvm-as"), Some("E-OUT-0403"));
        assert_eq!(missing_tool_code("lld-link"), Some("E-OUT-0405"));
        assert_eq!(missing_tool_code("clang"), None);
    }

    #[test]
    fn repo_local_llvm_takes_priority_over_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join(REPO_LLVM_BIN);
        std::fs::create_dir_all(&bin).expect("mkdirs");
        std::fs::write(bin.join("llvm-as"), b"").expect("touch");
        let (path, diags) = resolve_tool(dir.path(), "llvm-as");
        assert!(diags.is_empty());
        assert_eq!(path, Some(bin.join("llvm-as")));
    }

    #[test]
    fn tool_candidates_add_exe_on_windows_only() {
        let candidates = tool_candidates("lld-link");
        if cfg!(windows) {
            assert_eq!(candidates.len(), 2);
            assert!(candidates[1].ends_with(".exe"));
        } else {
            assert_eq!(candidates, vec!["lld-link".to_string()]);
        }
    }
}
