//! The build driver.
//!
//! Pipeline: find the project root, parse the manifest, discover module
//! files, hand them to the parser seam, run `analyze`, plan outputs, and
//! report. Exit code 0 on success, 1 on any error diagnostic, 2 when an
//! error came from a host-primitive surface (infrastructure failure).

use std::rc::Rc;

use c0_checker::{Analysis, analyze};
use c0_common::diagnostics::CompileStatus;
use c0_common::{Diagnostic, DiagnosticStream, Interner, NullSink, Severity, TraceBuffer, TraceSink};
use c0_project::manifest::{EmitIr, Manifest};
use c0_project::{
    check_output_hygiene, discover_module_files, find_project_root, parse_manifest, plan_outputs,
};
use c0_syntax::AstModule;
use tracing::info;

use crate::args::{BuildArgs, EmitIrArg};

/// Process exit codes of `c0 build`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Diagnostics,
    Infrastructure,
}

impl ExitCode {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Diagnostics => 1,
            ExitCode::Infrastructure => 2,
        }
    }
}

/// Codes whose failures surface through host primitives rather than the
/// language.
fn is_infrastructure_code(code: &str) -> bool {
    code == "E-PRJ-0102" || code.starts_with("E-OUT-")
}

fn exit_code_for(diags: &DiagnosticStream) -> ExitCode {
    let has_error = diags.iter().any(|d| d.severity == Severity::Error);
    if !has_error {
        return ExitCode::Success;
    }
    let infrastructure = diags
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .all(|d| is_infrastructure_code(&d.code));
    if infrastructure {
        ExitCode::Infrastructure
    } else {
        ExitCode::Diagnostics
    }
}

fn render_diagnostic(interner: &Interner, diag: &Diagnostic) -> String {
    let mut out = format!("{}[{}]: {}", diag.severity.label(), diag.code, diag.message);
    if let Some(span) = diag.span {
        if span.file.is_valid() {
            out.push_str(&format!(
                " ({}:{}:{})",
                interner.resolve(span.file),
                span.start_line,
                span.start_col
            ));
        }
    }
    out
}

fn print_diagnostics(interner: &Interner, diags: &DiagnosticStream, json: bool) {
    if json {
        if let Ok(rendered) = serde_json::to_string_pretty(diags) {
            println!("{rendered}");
        }
        return;
    }
    for diag in diags {
        eprintln!("{}", render_diagnostic(interner, diag));
    }
}

/// The parser seam. The lexer/parser are external collaborators; until
/// they are wired in, each discovered file contributes an empty module
/// at its path, which keeps the rest of the pipeline honest.
fn load_modules(interner: &Interner, project_root: &std::path::Path) -> Vec<AstModule> {
    discover_module_files(project_root)
        .into_iter()
        .map(|file| AstModule {
            path: file
                .module_path
                .iter()
                .map(|segment| interner.intern(segment))
                .collect(),
            items: Vec::new(),
            span: c0_common::Span::dummy(),
        })
        .collect()
}

fn apply_emit_ir_override(manifest: &mut Manifest, emit_ir: Option<EmitIrArg>) {
    if let Some(mode) = emit_ir {
        manifest.emit_ir = match mode {
            EmitIrArg::Ll => EmitIr::Ll,
            EmitIrArg::Bc => EmitIr::Bc,
            EmitIrArg::None => EmitIr::None,
        };
    }
}

/// Run `c0 build`.
#[must_use]
pub fn run_build(args: &BuildArgs) -> ExitCode {
    let interner = Rc::new(Interner::new());
    let project_root = find_project_root(&args.path);
    info!(root = %project_root.display(), "building");

    let (manifest, mut diags) = parse_manifest(&project_root);
    let Some(mut manifest) = manifest else {
        print_diagnostics(&interner, &diags, args.json);
        return exit_code_for(&diags);
    };
    apply_emit_ir_override(&mut manifest, args.emit_ir);

    let modules = load_modules(&interner, &project_root);
    let module_paths: Vec<c0_syntax::ModulePath> =
        modules.iter().map(|module| module.path.clone()).collect();

    let trace: Rc<dyn TraceSink> = if args.trace_spec {
        Rc::new(TraceBuffer::new())
    } else {
        Rc::new(NullSink)
    };
    let analysis: Analysis = analyze(Rc::clone(&interner), modules, trace);
    diags.extend(analysis.diags.iter().cloned());

    let layout = plan_outputs(&interner, &project_root, &manifest, &module_paths);
    diags.extend(check_output_hygiene(&layout));

    print_diagnostics(&interner, &diags, args.json);
    if analysis.status() == CompileStatus::Ok && args.json {
        if let Ok(rendered) = serde_json::to_string_pretty(&analysis.init_plan) {
            println!("{rendered}");
        }
    }
    exit_code_for(&diags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use c0_common::Span;

    fn diag(code: &str, severity: Severity) -> Diagnostic {
        Diagnostic {
            code: code.to_string(),
            severity,
            message: String::new(),
            span: Some(Span::dummy()),
        }
    }

    #[test]
    fn clean_stream_exits_zero() {
        assert_eq!(exit_code_for(&Vec::new()), ExitCode::Success);
        let warnings = vec![diag("W-REG-0001", Severity::Warning)];
        assert_eq!(exit_code_for(&warnings), ExitCode::Success);
    }

    #[test]
    fn language_errors_exit_one() {
        let diags = vec![diag("E-MOD-1207", Severity::Error)];
        assert_eq!(exit_code_for(&diags), ExitCode::Diagnostics);
    }

    #[test]
    fn infrastructure_errors_exit_two() {
        let diags = vec![diag("E-OUT-0403", Severity::Error)];
        assert_eq!(exit_code_for(&diags), ExitCode::Infrastructure);

        // Mixed failures surface as ordinary diagnostics.
        let mixed = vec![
            diag("E-OUT-0403", Severity::Error),
            diag("E-MOD-1302", Severity::Error),
        ];
        assert_eq!(exit_code_for(&mixed), ExitCode::Diagnostics);
    }

    #[test]
    fn build_of_empty_project_reports_missing_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = BuildArgs {
            path: dir.path().to_path_buf(),
            emit_ir: None,
            json: false,
            trace_spec: false,
        };
        // No Cursive.toml anywhere under the tempdir.
        let code = run_build(&args);
        assert_ne!(code, ExitCode::Success);
    }

    #[test]
    fn build_of_minimal_project_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("Cursive.toml"),
            "[assembly]\nname = \"demo\"\n",
        )
        .expect("write");
        std::fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        std::fs::write(dir.path().join("src").join("main.c0"), b"").expect("write");
        let args = BuildArgs {
            path: dir.path().to_path_buf(),
            emit_ir: None,
            json: false,
            trace_spec: false,
        };
        assert_eq!(run_build(&args), ExitCode::Success);
    }
}
