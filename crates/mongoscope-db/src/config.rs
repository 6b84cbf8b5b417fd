//! Dial configuration
//!
//! A [`DialConfig`] describes how to reach the server. It is handed to the
//! session manager once and never changes afterwards.
//!
//! Configurations can be built in code or loaded from TOML:
//!
//! ```toml
//! addresses = ["db1.internal:27017", "db2.internal:27017"]
//! timeout_ms = 500
//! fail_fast = true
//! database = "inventory"
//! replica_set = "rs0"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::target::validate_database_name;

/// Default server address used when none is configured
pub const DEFAULT_ADDRESS: &str = "localhost:27017";

/// Default dial timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while loading or validating a dial configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse dial config: {message}")]
	Parse { message: String },

	#[error("invalid dial config: {0}")]
	Invalid(String),
}

/// Server addresses, timeouts and credentials used to dial the base connection
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialConfig {
	/// Seed list in `host:port` form
	pub addresses: Vec<String>,

	/// Upper bound on server selection while dialing
	#[serde(rename = "timeout_ms", with = "duration_ms")]
	pub timeout: Duration,

	/// Give up on unreachable servers instead of waiting out the driver defaults
	pub fail_fast: bool,

	/// Database selected by managers built from this configuration
	pub database: Option<String>,

	pub username: Option<String>,
	pub password: Option<String>,

	/// Database holding the user's credentials
	pub source: Option<String>,

	pub replica_set: Option<String>,

	/// Talk only to the given server instead of discovering the topology
	pub direct: bool,

	pub app_name: Option<String>,

	/// Maximum number of pooled sockets per server
	pub pool_limit: Option<u32>,
}

impl Default for DialConfig {
	fn default() -> Self {
		Self {
			addresses: vec![DEFAULT_ADDRESS.to_string()],
			timeout: DEFAULT_TIMEOUT,
			fail_fast: false,
			database: None,
			username: None,
			password: None,
			source: None,
			replica_set: None,
			direct: false,
			app_name: None,
			pool_limit: None,
		}
	}
}

impl DialConfig {
	/// Create a configuration for the given seed addresses
	///
	/// # Example
	///
	/// ```rust
	/// use mongoscope_db::DialConfig;
	/// use std::time::Duration;
	///
	/// let config = DialConfig::new(["localhost:27017"])
	///     .with_timeout(Duration::from_millis(500))
	///     .with_fail_fast(true);
	/// assert_eq!(config.addresses, vec!["localhost:27017".to_string()]);
	/// assert!(config.fail_fast);
	/// ```
	pub fn new<I, S>(addresses: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			addresses: addresses.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
		self.fail_fast = fail_fast;
		self
	}

	/// Set the database every manager built from this configuration starts with
	pub fn with_database(mut self, database: impl Into<String>) -> Self {
		self.database = Some(database.into());
		self
	}

	pub fn with_credentials(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.username = Some(username.into());
		self.password = Some(password.into());
		self
	}

	pub fn with_auth_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}

	pub fn with_replica_set(mut self, name: impl Into<String>) -> Self {
		self.replica_set = Some(name.into());
		self
	}

	pub fn with_direct(mut self, direct: bool) -> Self {
		self.direct = direct;
		self
	}

	pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
		self.app_name = Some(name.into());
		self
	}

	pub fn with_pool_limit(mut self, limit: u32) -> Self {
		self.pool_limit = Some(limit);
		self
	}

	/// Load configuration from a TOML file.
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read, parsed or validated.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			source: e,
		})?;

		Self::from_toml(&content)
	}

	/// Parse and validate configuration from a TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
			message: e.to_string(),
		})?;
		config.validate()?;
		Ok(config)
	}

	/// Check that the configuration can be dialed
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.addresses.is_empty() {
			return Err(ConfigError::Invalid(
				"at least one server address is required".to_string(),
			));
		}
		if let Some(address) = self.addresses.iter().find(|a| a.trim().is_empty()) {
			return Err(ConfigError::Invalid(format!(
				"server address {:?} is empty",
				address
			)));
		}
		if self.timeout.is_zero() {
			return Err(ConfigError::Invalid("timeout must be non-zero".to_string()));
		}
		if self.username.is_none() && self.password.is_some() {
			return Err(ConfigError::Invalid(
				"password given without a username".to_string(),
			));
		}
		if self.pool_limit == Some(0) {
			return Err(ConfigError::Invalid(
				"pool_limit must be at least 1".to_string(),
			));
		}
		if let Some(database) = &self.database {
			validate_database_name(database)
				.map_err(|e| ConfigError::Invalid(e.to_string()))?;
		}
		Ok(())
	}
}

mod duration_ms {
	use serde::{Deserialize, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}
