//! Module-file discovery.
//!
//! Source files live under `<root>/src` with `.c0` extensions; the
//! relative directory path plus the file stem is the module path. The
//! parser (an external collaborator) turns the files into modules.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// A discovered source file and the module path segments it implies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleFile {
    pub path: PathBuf,
    pub module_path: Vec<String>,
}

/// Find every `.c0` file under `<root>/src`, sorted by path for
/// deterministic module numbering.
#[must_use]
pub fn discover_module_files(project_root: &Path) -> Vec<ModuleFile> {
    let src = project_root.join("src");
    let mut files: Vec<ModuleFile> = WalkDir::new(&src)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "c0"))
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(&src).ok()?;
            let mut segments: Vec<String> = rel
                .parent()
                .into_iter()
                .flat_map(|parent| parent.components())
                .map(|component| component.as_os_str().to_string_lossy().into_owned())
                .collect();
            segments.push(rel.file_stem()?.to_string_lossy().into_owned());
            Some(ModuleFile {
                path: entry.path().to_path_buf(),
                module_path: segments,
            })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(count = files.len(), "module files discovered");
    files
}
