#[cfg(feature = "testcontainers")]
use rstest::*;
#[cfg(feature = "testcontainers")]
use std::time::Duration;

#[cfg(feature = "testcontainers")]
use testcontainers::{
	ImageExt,
	core::{IntoContainerPort, WaitFor},
	runners::AsyncRunner,
};

#[cfg(feature = "testcontainers")]
use mongoscope_db::{DialConfig, MongoSessionManager, SessionManager};

// Public re-exports for fixtures.rs
#[cfg(feature = "testcontainers")]
pub use testcontainers::{ContainerAsync, GenericImage};

// ============================================================================
// MongoDB Container Fixture
// ============================================================================

#[cfg(feature = "testcontainers")]
async fn try_start_mongodb_container()
-> Result<(ContainerAsync<GenericImage>, String, u16), Box<dyn std::error::Error>> {
	let mongo = GenericImage::new("mongo", "7.0")
		.with_exposed_port(27017.tcp())
		.with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
		.with_startup_timeout(Duration::from_secs(60))
		.start()
		.await?;

	let port = mongo.get_host_port_ipv4(27017).await?;
	let address = format!("127.0.0.1:{}", port);

	Ok((mongo, address, port))
}

/// Fixture providing a MongoDB container
///
/// Starts a MongoDB 7.0 container and returns it with its `host:port`
/// address and mapped port. Keep the container alive for the whole test.
#[cfg(feature = "testcontainers")]
#[fixture]
pub async fn mongodb_container() -> (ContainerAsync<GenericImage>, String, u16) {
	const MAX_RETRIES: u32 = 3;
	const RETRY_DELAY_MS: u64 = 2000;

	let mut last_error = None;

	for attempt in 0..MAX_RETRIES {
		match try_start_mongodb_container().await {
			Ok(result) => return result,
			Err(e) => {
				eprintln!(
					"MongoDB container start attempt {} of {} failed: {:?}",
					attempt + 1,
					MAX_RETRIES,
					e
				);
				last_error = Some(e);

				if attempt < MAX_RETRIES - 1 {
					tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
				}
			}
		}
	}

	panic!(
		"Failed to start MongoDB container after {} attempts: {:?}",
		MAX_RETRIES, last_error
	);
}

/// Dial configuration pointing at a single test server
#[cfg(feature = "testcontainers")]
pub fn container_dial_config(address: &str) -> DialConfig {
	DialConfig::new([address])
		.with_direct(true)
		.with_timeout(Duration::from_secs(10))
		.with_app_name("mongoscope-tests")
}

/// Fixture providing an undialed session manager for a fresh MongoDB container
#[cfg(feature = "testcontainers")]
#[fixture]
pub async fn mongodb_manager() -> (ContainerAsync<GenericImage>, MongoSessionManager) {
	let (container, address, _port) = mongodb_container().await;

	let manager = SessionManager::new(container_dial_config(&address))
		.expect("Failed to create MongoDB session manager");

	(container, manager)
}
