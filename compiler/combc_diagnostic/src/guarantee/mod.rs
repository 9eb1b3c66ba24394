//! Proof that at least one error was reported.

/// Type-level proof that an error diagnostic was pushed to a queue.
///
/// Can only be obtained from [`DiagnosticQueue`](crate::DiagnosticQueue),
/// so a phase returning `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }
}
