//! Output layout, mangling, and hygiene.
//!
//! For assembly `A` with output directory `D` (default `build`):
//! `<root>/<D>/obj/<mangled>.obj` per module, `<root>/<D>/ir/<mangled>.{ll,bc}`
//! when IR emission is on, and `<root>/<D>/bin/A.exe` for executables.
//! Every planned path must stay under the output root, and mangled names
//! must not collide.

use std::path::{Path, PathBuf};

use c0_common::{DiagnosticStream, Interner, make_diagnostic_with};
use c0_syntax::{Identifier, ModulePath};

use crate::manifest::{AssemblyKind, EmitIr, Manifest};

/// Mangle one path component: alphanumerics pass through, everything
/// else becomes `_XX` hex escapes so distinct names stay distinct.
fn mangle_component(out: &mut String, component: &str) {
    for ch in component.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                out.push('_');
                out.push_str(&format!("{byte:02x}"));
            }
        }
    }
}

/// Canonical symbol form of a module path. Injective: components join
/// with `$`, which the escape never produces.
#[must_use]
pub fn mangle_module_path(interner: &Interner, path: &[Identifier]) -> String {
    let mut out = String::new();
    for (i, &id) in path.iter().enumerate() {
        if i > 0 {
            out.push('$');
        }
        mangle_component(&mut out, &interner.resolve(id));
    }
    out
}

/// The planned outputs of one build.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    pub out_root: PathBuf,
    pub obj_dir: PathBuf,
    pub ir_dir: PathBuf,
    pub bin_dir: PathBuf,
    /// One object per module, in module order.
    pub objects: Vec<PathBuf>,
    /// IR files when emission is enabled.
    pub ir_files: Vec<PathBuf>,
    /// The linked artifact for executable assemblies.
    pub binary: Option<PathBuf>,
}

/// Compute the full output layout for a set of modules.
#[must_use]
pub fn plan_outputs(
    interner: &Interner,
    project_root: &Path,
    manifest: &Manifest,
    modules: &[ModulePath],
) -> OutputLayout {
    let out_root = project_root.join(manifest.out_dir.as_deref().unwrap_or("build"));
    let obj_dir = out_root.join("obj");
    let ir_dir = out_root.join("ir");
    let bin_dir = out_root.join("bin");

    let mangled: Vec<String> = modules
        .iter()
        .map(|path| mangle_module_path(interner, path))
        .collect();

    let objects = mangled
        .iter()
        .map(|name| obj_dir.join(format!("{name}.obj")))
        .collect();
    let ir_files = match manifest.emit_ir {
        EmitIr::None => Vec::new(),
        EmitIr::Ll => mangled.iter().map(|name| ir_dir.join(format!("{name}.ll"))).collect(),
        EmitIr::Bc => mangled.iter().map(|name| ir_dir.join(format!("{name}.bc"))).collect(),
    };
    let binary = match manifest.kind {
        AssemblyKind::Executable => Some(bin_dir.join(format!("{}.exe", manifest.name))),
        AssemblyKind::Library => None,
    };

    OutputLayout {
        out_root,
        obj_dir,
        ir_dir,
        bin_dir,
        objects,
        ir_files,
        binary,
    }
}

fn under_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Output hygiene: every planned path is under the output root, and no
/// two modules mangle to the same object path.
#[must_use]
pub fn check_output_hygiene(layout: &OutputLayout) -> DiagnosticStream {
    let mut diags = DiagnosticStream::new();
    let mut emit = |path: &Path| {
        if let Some(diag) = make_diagnostic_with(
            "E-OUT-0406",
            None,
            &[("path", &path.display().to_string())],
        ) {
            diags.push(diag);
        }
    };

    let all_paths = layout
        .objects
        .iter()
        .chain(&layout.ir_files)
        .chain(layout.binary.as_ref());
    for path in all_paths {
        if !under_root(path, &layout.out_root) {
            emit(path);
        }
    }

    let mut seen: Vec<&PathBuf> = Vec::with_capacity(layout.objects.len());
    for path in &layout.objects {
        if seen.contains(&path) {
            emit(path);
        } else {
            seen.push(path);
        }
    }
    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use c0_common::Interner;

    fn manifest(emit_ir: EmitIr) -> Manifest {
        Manifest {
            name: "demo".to_string(),
            kind: AssemblyKind::Executable,
            out_dir: None,
            emit_ir,
        }
    }

    fn mp(interner: &Interner, segs: &[&str]) -> ModulePath {
        segs.iter().map(|s| interner.intern(s)).collect()
    }

    #[test]
    fn mangling_is_injective_on_distinct_paths() {
        let interner = Interner::new();
        let paths = [
            mp(&interner, &["a", "b"]),
            mp(&interner, &["a_b"]),
            mp(&interner, &["a", "b_c"]),
            mp(&interner, &["a$b"]),
            mp(&interner, &["ab"]),
        ];
        let mut mangled: Vec<String> = paths
            .iter()
            .map(|p| mangle_module_path(&interner, p))
            .collect();
        mangled.sort();
        mangled.dedup();
        assert_eq!(mangled.len(), paths.len(), "collision in {mangled:?}");
    }

    #[test]
    fn layout_places_outputs_under_the_root() {
        let interner = Interner::new();
        let root = Path::new("/proj");
        let layout = plan_outputs(
            &interner,
            root,
            &manifest(EmitIr::Ll),
            &[mp(&interner, &["m1"]), mp(&interner, &["m2"])],
        );
        assert_eq!(layout.out_root, root.join("build"));
        assert_eq!(layout.objects.len(), 2);
        assert_eq!(layout.ir_files.len(), 2);
        assert!(layout.objects[0].starts_with(root.join("build/obj")));
        assert!(layout.ir_files[0].to_string_lossy().ends_with(".ll"));
        assert_eq!(
            layout.binary.as_deref(),
            Some(root.join("build/bin/demo.exe").as_path())
        );
        assert!(check_output_hygiene(&layout).is_empty());
    }

    #[test]
    fn emit_ir_none_plans_no_ir() {
        let interner = Interner::new();
        let layout = plan_outputs(
            &interner,
            Path::new("/proj"),
            &manifest(EmitIr::None),
            &[mp(&interner, &["m1"])],
        );
        assert!(layout.ir_files.is_empty());
    }

    #[test]
    fn custom_out_dir_is_respected() {
        let interner = Interner::new();
        let mut m = manifest(EmitIr::None);
        m.out_dir = Some("dist".to_string());
        let layout = plan_outputs(&interner, Path::new("/proj"), &m, &[mp(&interner, &["m1"])]);
        assert_eq!(layout.out_root, Path::new("/proj/dist"));
    }

    #[test]
    fn duplicate_mangled_paths_are_0406() {
        let interner = Interner::new();
        let same = mp(&interner, &["m1"]);
        let layout = plan_outputs(
            &interner,
            Path::new("/proj"),
            &manifest(EmitIr::None),
            &[same.clone(), same],
        );
        let diags = check_output_hygiene(&layout);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E-OUT-0406");
    }
}
