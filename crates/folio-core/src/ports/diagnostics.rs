//! Diagnostic sink for best-effort warnings.
//!
//! Background work (prefetching) never reports failures to a caller. It hands
//! them to a sink instead. Sinks must not block and must not fail.

/// Accepts best-effort warning messages.
pub trait DiagnosticSink: Send + Sync {
    /// Record a warning.
    fn warn(&self, message: &str);
}

/// Forwards warnings to `tracing` under the `folio::diagnostics` target.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// Create a new tracing-backed sink.
    pub const fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for TracingDiagnostics {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "folio::diagnostics", "{message}");
    }
}

/// A sink that discards everything, for tests and quiet contexts.
#[derive(Debug, Clone, Default)]
pub struct NoopDiagnostics;

impl NoopDiagnostics {
    /// Create a new no-op sink.
    pub const fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for NoopDiagnostics {
    fn warn(&self, _message: &str) {}
}
