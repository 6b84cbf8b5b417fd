//! # mongoscope Test
//!
//! Testing utilities for mongoscope.
//!
//! ## Features
//!
//! - **[`RecordingDriver`]**: in-memory driver that counts dials, clones,
//!   releases, pings and closes, with injectable dial delays and failures
//! - **Fixtures**: `rstest` fixtures for recording managers and, with the
//!   `testcontainers` feature, a MongoDB 7.0 container
//! - **Logging**: one-shot `tracing` initialization for tests

pub mod driver;
pub mod fixtures;
pub mod logging;

pub use driver::{MockCollection, MockConnection, MockDriverError, MockSession, RecordingDriver};
pub use fixtures::{items_manager, recording_driver};
pub use logging::init_test_logging;

#[cfg(feature = "testcontainers")]
pub use fixtures::{container_dial_config, mongodb_container, mongodb_manager};
