//! Combine-rule compiler driver.
//!
//! Collects rule and fragment declarations in a [`Registry`], validates
//! every fragment once, then compiles each rule independently into a
//! [`RuleProgram`](combc_ir::RuleProgram). A failing declaration is
//! reported as a diagnostic and never stops the others.
//!
//! ```text
//! declarations ──► Registry ──► FragmentSet (validated once)
//!                     │
//!                     └──► per rule: lower ► expand ► infer ► emit
//!                                                      │
//!                                   CompileReport ◄────┘
//! ```

mod input;
mod options;
mod registry;

use std::sync::Once;

pub use input::{Declarations, LoadError};
pub use options::{CompileOptions, EmitKind, OptionError};
pub use registry::{CompileReport, Registry};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=combc=debug` or, for
/// per-operation detail, `RUST_LOG=combc_emit=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
