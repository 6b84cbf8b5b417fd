//! Test logging utilities
//!
//! Provides utilities for initializing tracing output in test environments.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests (call once)
///
/// Installs a `tracing-subscriber` formatter that writes through the test
/// harness, filtered by `RUST_LOG` (defaults to `mongoscope_db=debug`).
///
/// # Examples
///
/// ```
/// use mongoscope_test::logging::init_test_logging;
///
/// init_test_logging();
/// init_test_logging(); // later calls are no-ops
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mongoscope_db=debug"));

		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_test_writer()
			.try_init();
	});
}
