//! `Cursive.toml` loading.
//!
//! The project root is the nearest ancestor of the input carrying a
//! `Cursive.toml`; without one, the starting directory stands in. A
//! missing manifest is `E-PRJ-0101`, an unparsable one `E-PRJ-0102`.

use std::path::{Path, PathBuf};

use c0_common::host::{HostPrim, host_prim_fail};
use c0_common::{DiagnosticStream, make_diagnostic};
use serde::Deserialize;
use tracing::debug;

/// What the build produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyKind {
    #[default]
    Executable,
    Library,
}

/// IR emission mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitIr {
    Ll,
    Bc,
    #[default]
    None,
}

#[derive(Clone, Debug, Deserialize)]
struct AssemblySection {
    name: String,
    #[serde(default)]
    kind: AssemblyKind,
    #[serde(default)]
    out_dir: Option<String>,
    #[serde(default)]
    emit_ir: EmitIr,
}

#[derive(Clone, Debug, Deserialize)]
struct ManifestFile {
    assembly: AssemblySection,
}

/// A parsed project manifest.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub name: String,
    pub kind: AssemblyKind,
    pub out_dir: Option<String>,
    pub emit_ir: EmitIr,
}

fn start_dir_for_input(input_path: &Path) -> PathBuf {
    let dir = if input_path.is_dir() {
        input_path.to_path_buf()
    } else {
        input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };
    if dir.as_os_str().is_empty() {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        dir
    }
}

/// Ascend from the input until a `Cursive.toml` is found; fall back to
/// the starting directory.
#[must_use]
pub fn find_project_root(input_path: &Path) -> PathBuf {
    let start = start_dir_for_input(input_path);
    let mut current = start.clone();
    loop {
        if current.join("Cursive.toml").exists() {
            return current;
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => break,
        }
    }
    start
}

/// Parse `<root>/Cursive.toml`.
pub fn parse_manifest(project_root: &Path) -> (Option<Manifest>, DiagnosticStream) {
    let mut diags = DiagnosticStream::new();
    let manifest_path = project_root.join("Cursive.toml");

    if !manifest_path.exists() {
        if let Some(diag) = make_diagnostic("E-PRJ-0101", None) {
            diags.push(diag);
        }
        return (None, diags);
    }

    let text = match std::fs::read_to_string(&manifest_path) {
        Ok(text) => text,
        Err(_) => {
            if let Some(diag) = make_diagnostic("E-PRJ-0102", None) {
                diags.push(diag);
            }
            host_prim_fail(HostPrim::ParseToml, true);
            return (None, diags);
        }
    };

    match toml::from_str::<ManifestFile>(&text) {
        Ok(parsed) => {
            debug!(name = %parsed.assembly.name, "manifest parsed");
            (
                Some(Manifest {
                    name: parsed.assembly.name,
                    kind: parsed.assembly.kind,
                    out_dir: parsed.assembly.out_dir,
                    emit_ir: parsed.assembly.emit_ir,
                }),
                diags,
            )
        }
        Err(_) => {
            if let Some(diag) = make_diagnostic("E-PRJ-0102", None) {
                diags.push(diag);
            }
            host_prim_fail(HostPrim::ParseToml, true);
            (None, diags)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_manifest_is_0101() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (manifest, diags) = parse_manifest(dir.path());
        assert!(manifest.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E-PRJ-0101");
    }

    #[test]
    fn valid_manifest_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("Cursive.toml"),
            "[assembly]\nname = \"demo\"\nkind = \"executable\"\nemit_ir = \"ll\"\n",
        )
        .expect("write");
        let (manifest, diags) = parse_manifest(dir.path());
        assert!(diags.is_empty());
        let manifest = manifest.expect("parsed");
        assert_eq!(manifest.name, "demo");
        assert_eq!(manifest.kind, AssemblyKind::Executable);
        assert_eq!(manifest.emit_ir, EmitIr::Ll);
        assert_eq!(manifest.out_dir, None);
    }

    #[test]
    fn malformed_manifest_is_0102() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Cursive.toml"), "not [valid toml").expect("write");
        let (manifest, diags) = parse_manifest(dir.path());
        assert!(manifest.is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E-PRJ-0102");
    }

    #[test]
    fn root_search_ascends_to_the_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Cursive.toml"), "[assembly]\nname = \"x\"\n")
            .expect("write");
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).expect("mkdirs");
        assert_eq!(find_project_root(&nested), dir.path());
    }

    #[test]
    fn root_search_falls_back_to_the_start_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("src");
        std::fs::create_dir_all(&nested).expect("mkdir");
        // No manifest anywhere under the tempdir; the search may walk up
        // to the filesystem root and still come back to the start.
        let root = find_project_root(&nested);
        assert!(root == nested || root.join("Cursive.toml").exists());
    }
}
