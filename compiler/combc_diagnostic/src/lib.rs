//! Diagnostic system for combine-rule compilation errors.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Origin (which rule or fragment, which pattern)
//! - Notes and suggestions (why, and how to fix)
//!
//! # Error Guarantees
//!
//! Every failure is fatal to the rule or fragment being processed and to
//! nothing else. Callers collect diagnostics into a [`DiagnosticQueue`] and
//! carry on with the next declaration; [`ErrorGuaranteed`] proves a failed
//! declaration was actually reported.

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Origin, OriginKind, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
