//! Test utilities for ng-expander
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration test suite:
//! - [`init_test_logging`] - one-shot tracing setup that plays well with the test harness
//! - [`MemoryLoader`] - in-memory templates with optional per-reference fetch delays
//! - [`TemplateTree`] - a temporary directory of template files
//!
//! # Example
//!
//! ```rust,no_run
//! use ng_expander::test_utils::MemoryLoader;
//! use ng_expander::{ExpandOptions, Expander};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), ng_expander::ExpandError> {
//! let loader = MemoryLoader::new()
//!     .with_template("index.html", "<ng-include src=\"'slow.html'\"></ng-include>")
//!     .with_template("slow.html", "<p>late</p>")
//!     .with_delay("slow.html", Duration::from_millis(50));
//! let output = Expander::new(loader, ExpandOptions::default())?.expand("index.html").await?;
//! assert_eq!(output, "<noop><p>late</p></noop>");
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod memory_loader;

pub use fixtures::TemplateTree;
pub use memory_loader::MemoryLoader;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with neither,
/// logging stays off.
///
/// ```bash
/// RUST_LOG=ng_expander=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
