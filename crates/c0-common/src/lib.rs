//! Common types and utilities for the Cursive 0 bootstrap compiler.
//!
//! This crate provides the foundational layer used across all c0 crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`, `Spanned`)
//! - Diagnostics: severity, streams, the closed code taxonomy
//! - Rule-ID to diagnostic-code maps
//! - The host-primitive failure taxonomy and the UB model
//! - Spec-trace instrumentation sinks
//! - Pure filesystem path algebra (canonicalization without IO)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - source location tracking
pub mod span;
pub use span::{Span, Spanned};

// Diagnostics: severity, stream algebra, message table
pub mod diagnostics;
pub use diagnostics::{
    CompileStatus, Diagnostic, DiagnosticStream, Severity, compile_status, emit, emit_traced,
    format_message, has_error, make_diagnostic, make_diagnostic_with,
};

// Rule-ID to external-code maps
pub mod codes;
pub use codes::{DiagCodeMap, DiagId, c0_code, code, spec_code};

// Host primitive taxonomy
pub mod host;
pub use host::HostPrim;

// Undefined-behavior model
pub mod ub;
pub use ub::{BehaviorClass, RawPtrPermission};

// Spec-trace instrumentation
pub mod trace;
pub use trace::{NullSink, TraceBuffer, TraceRecord, TraceSink};

// Pure path algebra (no IO)
pub mod paths;
