//! Diagnostic queue for collecting diagnostics across many declarations.
//!
//! Features:
//! - Error limits to keep output readable on large inputs
//! - Deduplication of identical diagnostics for the same declaration
//! - `ErrorGuaranteed` proof that errors were emitted
//!
//! Diagnostics are kept in insertion order. Callers that compile in parallel
//! push results in declaration order, so output stays deterministic.

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with a cap on reported errors.
    pub fn limited(error_limit: usize) -> Self {
        DiagnosticConfig {
            error_limit,
            ..Self::default()
        }
    }
}

/// Queue for collecting and deduplicating diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
    /// Errors dropped by the limit.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }

        if self.config.deduplicate && !self.seen.insert(diag.clone()) {
            return false;
        }

        self.diagnostics.push(diag);
        if is_error {
            self.error_count += 1;
        }
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Number of errors dropped because the limit was reached.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Check if any errors were emitted and get proof if so.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        if self.error_count > 0 {
            Some(ErrorGuaranteed::new())
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Return the queued diagnostics and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        self.error_count = 0;
        self.suppressed = 0;
        std::mem::take(&mut self.diagnostics)
    }
}

impl Extend<Diagnostic> for DiagnosticQueue {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        for diag in iter {
            self.add(diag);
        }
    }
}
