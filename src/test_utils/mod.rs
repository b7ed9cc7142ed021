//! Test utilities for debforge
//!
//! Helpers shared by unit tests and the integration suite (enabled there through the
//! `test-utils` feature):
//! - [`TestGit`] - synchronous git runner for building fixture repositories
//! - [`ReleaseRepoFixture`] - release repositories with version and packaging tags
//! - [`MockSource`] - an in-memory package universe
//! - [`init_test_logging`] - opt-in tracing output for a test run

pub mod fixtures;
pub mod git_helper;
pub mod mock_source;

pub use fixtures::{ReleaseRepoFixture, package_xml};
pub use git_helper::TestGit;
pub use mock_source::MockSource;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// With `level` unset, logging is only enabled when `RUST_LOG` is present.
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
            .try_init();
    });
}
