//! Session manager error types
//!
//! Driver failures are carried verbatim inside [`DriverError`]; the manager
//! only adds its own variants for misconfiguration and use after close.

use std::error::Error as StdError;
use std::fmt;

use crate::config::ConfigError;

/// Result type for session manager operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Boxed error raised by a [`SessionDriver`](crate::driver::SessionDriver)
///
/// `Display` and `source()` delegate to the wrapped error, so callers observe
/// exactly what the driver reported.
pub struct DriverError(Box<dyn StdError + Send + Sync + 'static>);

impl DriverError {
	/// Wrap a driver error
	pub fn new<E>(error: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		Self(Box::new(error))
	}

	/// Borrow the wrapped error as a concrete type
	///
	/// # Example
	///
	/// ```rust
	/// use mongoscope_db::DriverError;
	///
	/// let err = DriverError::new(std::io::Error::other("connection refused"));
	/// assert!(err.downcast_ref::<std::io::Error>().is_some());
	/// ```
	pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
		self.0.downcast_ref::<E>()
	}

	/// Unwrap into the boxed driver error
	pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
		self.0
	}
}

impl fmt::Debug for DriverError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&self.0, f)
	}
}

impl fmt::Display for DriverError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl StdError for DriverError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.0.source()
	}
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for DriverError {
	fn from(err: mongodb::error::Error) -> Self {
		DriverError::new(err)
	}
}

/// Which selector a name was supplied for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
	Database,
	Collection,
}

impl fmt::Display for NameKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NameKind::Database => f.write_str("database"),
			NameKind::Collection => f.write_str("collection"),
		}
	}
}

/// Errors returned by [`SessionManager`](crate::SessionManager)
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
	/// First-time connection establishment failed
	#[error(transparent)]
	Dial(DriverError),

	/// A per-call session could not be derived from the base connection
	#[error(transparent)]
	Session(DriverError),

	/// The liveness probe failed
	#[error(transparent)]
	Ping(DriverError),

	/// Driver error raised from inside a query function
	#[error(transparent)]
	Driver(DriverError),

	#[error("database must be configured first")]
	DatabaseNotConfigured,

	#[error("collection must be configured before executing a query")]
	CollectionNotConfigured,

	#[error("invalid {kind} name {name:?}: {reason}")]
	InvalidName {
		kind: NameKind,
		name: String,
		reason: &'static str,
	},

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("session manager has been closed")]
	Closed,
}

impl SessionError {
	/// Whether this error came from establishing the base connection
	pub fn is_dial(&self) -> bool {
		matches!(self, SessionError::Dial(_))
	}

	/// Whether this error reports a misconfigured manager
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			SessionError::DatabaseNotConfigured
				| SessionError::CollectionNotConfigured
				| SessionError::InvalidName { .. }
				| SessionError::Config(_)
		)
	}

	/// The driver error carried by this error, if any
	pub fn driver_error(&self) -> Option<&DriverError> {
		match self {
			SessionError::Dial(e)
			| SessionError::Session(e)
			| SessionError::Ping(e)
			| SessionError::Driver(e) => Some(e),
			_ => None,
		}
	}
}

impl From<DriverError> for SessionError {
	fn from(err: DriverError) -> Self {
		SessionError::Driver(err)
	}
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for SessionError {
	fn from(err: mongodb::error::Error) -> Self {
		SessionError::Driver(DriverError::new(err))
	}
}
