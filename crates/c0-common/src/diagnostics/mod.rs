//! Diagnostic types and the stream algebra.
//!
//! Diagnostics form a pure algebra: [`emit`] appends without mutating its
//! input, [`has_error`] folds severity, [`compile_status`] derives the
//! overall outcome. Message text comes from the closed code table in
//! `data.rs`; codes match `[EWV]-[A-Z]{3}-[0-9]{4}`.

use serde::Serialize;

use crate::span::Span;
use crate::trace::TraceSink;

mod data;
pub use data::{MESSAGES, MessageEntry, lookup_entry, message_for_code, severity_for_code};

/// Diagnostic severity. Warnings never fail a compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single reported diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// An ordered sequence of diagnostics.
pub type DiagnosticStream = Vec<Diagnostic>;

/// Overall compile outcome derived from a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CompileStatus {
    Ok,
    Fail,
}

/// Append a diagnostic, returning the extended stream. The input prefix is
/// preserved verbatim.
#[must_use]
pub fn emit(stream: &DiagnosticStream, diag: Diagnostic) -> DiagnosticStream {
    let mut out = stream.clone();
    out.push(diag);
    out
}

/// Append a diagnostic, recording a `Diag-Emit` trace anchor.
#[must_use]
pub fn emit_traced(
    stream: &DiagnosticStream,
    diag: Diagnostic,
    sink: &dyn TraceSink,
) -> DiagnosticStream {
    if sink.enabled() {
        let payload = format!(
            "code={};severity={};message={}",
            diag.code,
            diag.severity.label(),
            diag.message
        );
        sink.record("Diag-Emit", diag.span, Some(&payload));
    }
    emit(stream, diag)
}

/// Whether any diagnostic in the stream is an error.
#[must_use]
pub fn has_error(stream: &DiagnosticStream) -> bool {
    stream.iter().any(|d| d.severity == Severity::Error)
}

/// Fold a stream into the overall compile status.
#[must_use]
pub fn compile_status(stream: &DiagnosticStream) -> CompileStatus {
    if has_error(stream) {
        CompileStatus::Fail
    } else {
        CompileStatus::Ok
    }
}

/// Substitute `{name}` placeholders from a key/value argument list.
/// Placeholders with no matching key are left verbatim.
#[must_use]
pub fn format_message(template: &str, args: &[(&str, &str)]) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match args.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Resolve a code to a full diagnostic via the static table.
/// Returns `None` for codes outside the closed taxonomy.
#[must_use]
pub fn make_diagnostic(code: &str, span: Option<Span>) -> Option<Diagnostic> {
    let entry = lookup_entry(code)?;
    Some(Diagnostic {
        code: entry.code.to_string(),
        severity: entry.severity,
        message: entry.message.to_string(),
        span,
    })
}

/// Resolve a code to a diagnostic with `{name}` placeholders substituted.
#[must_use]
pub fn make_diagnostic_with(
    code: &str,
    span: Option<Span>,
    args: &[(&str, &str)],
) -> Option<Diagnostic> {
    let entry = lookup_entry(code)?;
    Some(Diagnostic {
        code: entry.code.to_string(),
        severity: entry.severity,
        message: format_message(entry.message, args),
        span,
    })
}
