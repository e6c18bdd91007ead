//! Spec-trace instrumentation.
//!
//! Every rule firing and definition reference is a trace anchor. The sink
//! is threaded through analysis contexts rather than stored in a global so
//! tests can scope capture to one compilation.

use std::cell::RefCell;

use crate::span::Span;

/// One recorded trace anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub rule_id: String,
    pub span: Option<Span>,
    pub payload: Option<String>,
}

/// Receiver for rule firings and definition references.
///
/// Rule IDs with no entry in the code maps still flow through here; firing
/// an unmapped rule is silent, never an assertion failure.
pub trait TraceSink {
    /// Whether recording is active. Callers may skip payload construction
    /// when this is false.
    fn enabled(&self) -> bool;

    /// Record a rule firing, with optional span and payload.
    fn record(&self, rule_id: &str, span: Option<Span>, payload: Option<&str>);

    /// Record a rule firing with no location.
    fn rule(&self, rule_id: &str) {
        self.record(rule_id, None, None);
    }

    /// Record a rule firing at a span.
    fn rule_at(&self, rule_id: &str, span: Span) {
        self.record(rule_id, Some(span), None);
    }

    /// Record a definition reference (`name` defined in spec `section`).
    fn def(&self, name: &str, section: &str) {
        if self.enabled() {
            self.record(name, None, Some(section));
        }
    }

    /// Record a coverage anchor; tests assert on these the same way as
    /// on rule firings.
    fn cov(&self, rule_id: &str) {
        self.record(rule_id, None, None);
    }
}

/// Sink that drops everything; used when spec-trace is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&self, _rule_id: &str, _span: Option<Span>, _payload: Option<&str>) {}
}

/// Sink that accumulates records for test assertions.
#[derive(Debug, Default)]
pub struct TraceBuffer {
    records: RefCell<Vec<TraceRecord>>,
}

impl TraceBuffer {
    #[must_use]
    pub fn new() -> Self {
        TraceBuffer::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records.borrow().clone()
    }

    /// Whether a rule with the given ID fired at least once.
    #[must_use]
    pub fn fired(&self, rule_id: &str) -> bool {
        self.records.borrow().iter().any(|r| r.rule_id == rule_id)
    }

    /// Number of firings of a rule.
    #[must_use]
    pub fn count(&self, rule_id: &str) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.rule_id == rule_id)
            .count()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl TraceSink for TraceBuffer {
    fn enabled(&self) -> bool {
        true
    }

    fn record(&self, rule_id: &str, span: Option<Span>, payload: Option<&str>) {
        self.records.borrow_mut().push(TraceRecord {
            rule_id: rule_id.to_string(),
            span,
            payload: payload.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_is_disabled() {
        let sink = NullSink;
        assert!(!sink.enabled());
        sink.rule("Emit-Append");
    }

    #[test]
    fn buffer_records_rules_in_order() {
        let buffer = TraceBuffer::new();
        buffer.rule("Collect-Ok");
        buffer.rule_at("Intro-Dup", Span::dummy());
        assert!(buffer.fired("Collect-Ok"));
        assert!(buffer.fired("Intro-Dup"));
        assert!(!buffer.fired("Lin-Fail"));
        let records = buffer.records();
        assert_eq!(records[0].rule_id, "Collect-Ok");
        assert_eq!(records[1].span, Some(Span::dummy()));
    }

    #[test]
    fn count_tallies_repeat_firings() {
        let buffer = TraceBuffer::new();
        buffer.rule("Merge-Step");
        buffer.rule("Merge-Step");
        assert_eq!(buffer.count("Merge-Step"), 2);
        buffer.clear();
        assert_eq!(buffer.count("Merge-Step"), 0);
    }
}
