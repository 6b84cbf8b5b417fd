use rstest::*;

use crate::driver::RecordingDriver;
use mongoscope_db::{DialConfig, SessionManager};

#[cfg(feature = "testcontainers")]
pub mod testcontainers;

#[cfg(feature = "testcontainers")]
pub use self::testcontainers::{
	ContainerAsync, GenericImage, container_dial_config, mongodb_container, mongodb_manager,
};

/// Fresh recording driver with default behaviour
#[fixture]
pub fn recording_driver() -> RecordingDriver {
	RecordingDriver::new()
}

/// Undialed manager over `driver`, targeting `testdb.items`
///
/// The caller keeps a clone of `driver` to inspect what the manager did.
pub fn items_manager(driver: &RecordingDriver) -> SessionManager<RecordingDriver> {
	SessionManager::with_driver(driver.clone(), DialConfig::default().with_database("testdb"))
		.and_then(|manager| manager.with_collection("items"))
		.expect("Failed to configure test session manager")
}
