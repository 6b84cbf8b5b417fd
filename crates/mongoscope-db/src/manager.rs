//! Session manager
//!
//! [`SessionManager`] wraps the three steps every database call otherwise
//! repeats: dial if needed, clone a session, release it afterwards.
//!
//! Managers are cheap values. [`SessionManager::with_database`] and
//! [`SessionManager::with_collection`] return new managers and leave the
//! receiver untouched, while every manager derived from the same constructor
//! call shares one base connection slot. The slot is dialed lazily, exactly
//! once, by whichever call needs it first.
//!
//! # Example
//!
//! ```rust,no_run
//! use mongoscope_db::{DialConfig, SessionError, SessionManager};
//! use mongodb::bson::doc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), SessionError> {
//! let config = DialConfig::new(["localhost:27017"])
//!     .with_timeout(Duration::from_millis(500))
//!     .with_fail_fast(true);
//!
//! let items = SessionManager::new(config)?
//!     .with_database("testdb")?
//!     .with_collection("items")?;
//!
//! let found = items
//!     .execute(|scope| {
//!         Box::pin(async move {
//!             let (items, session) = scope.split();
//!             let found = items
//!                 .find_one(doc! { "id": "a" })
//!                 .session(session)
//!                 .await?;
//!             Ok::<_, SessionError>(found)
//!         })
//!     })
//!     .await?;
//!
//! items.close().await;
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;

use crate::config::DialConfig;
use crate::driver::SessionDriver;
use crate::error::{Result, SessionError};
use crate::scope::{CollectionScope, ScopedSession};
use crate::target::{Target, validate_collection_name, validate_database_name};

#[cfg(feature = "mongodb")]
use crate::driver::MongoDriver;

/// Session manager over the official MongoDB driver
#[cfg(feature = "mongodb")]
pub type MongoSessionManager = SessionManager<MongoDriver>;

/// Base connection slot shared by a manager lineage
pub(crate) struct ConnectionSlot<D: SessionDriver> {
	driver: D,
	config: DialConfig,
	base: OnceCell<D::Connection>,
	closed: AtomicBool,
	shut_down: AtomicBool,
}

impl<D: SessionDriver> ConnectionSlot<D> {
	fn new(driver: D, config: DialConfig) -> Self {
		Self {
			driver,
			config,
			base: OnceCell::new(),
			closed: AtomicBool::new(false),
			shut_down: AtomicBool::new(false),
		}
	}

	pub(crate) fn driver(&self) -> &D {
		&self.driver
	}

	fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Return the base connection, dialing it if this is the first use.
	///
	/// Concurrent first callers wait on the cell while one of them dials. A
	/// failed dial leaves the cell empty so the next caller dials again.
	async fn connection(&self) -> Result<&D::Connection> {
		if self.is_closed() {
			return Err(SessionError::Closed);
		}

		let base = self.base.get_or_try_init(|| self.dial()).await?;

		// A dial that finished after close() must not leak.
		if self.is_closed() {
			self.shutdown(base).await;
			return Err(SessionError::Closed);
		}

		Ok(base)
	}

	async fn dial(&self) -> Result<D::Connection> {
		tracing::debug!(
			addresses = ?self.config.addresses,
			timeout_ms = self.config.timeout.as_millis() as u64,
			fail_fast = self.config.fail_fast,
			"dialing base connection"
		);

		match self.driver.dial(&self.config).await {
			Ok(connection) => {
				tracing::info!(addresses = ?self.config.addresses, "base connection established");
				Ok(connection)
			}
			Err(e) => {
				tracing::warn!(addresses = ?self.config.addresses, error = %e, "dial failed");
				Err(SessionError::Dial(e))
			}
		}
	}

	async fn shutdown(&self, base: &D::Connection) {
		if !self.shut_down.swap(true, Ordering::AcqRel) {
			tracing::info!("closing base connection");
			self.driver.close(base).await;
		}
	}

	async fn close(&self) {
		self.closed.store(true, Ordering::Release);
		match self.base.get() {
			Some(base) => self.shutdown(base).await,
			None => tracing::debug!("close on a never-dialed session manager"),
		}
	}
}

/// Runs query functions against freshly cloned, collection-bound sessions
pub struct SessionManager<D: SessionDriver> {
	slot: Arc<ConnectionSlot<D>>,
	database: Option<String>,
	collection: Option<String>,
}

impl<D: SessionDriver> Clone for SessionManager<D> {
	fn clone(&self) -> Self {
		Self {
			slot: Arc::clone(&self.slot),
			database: self.database.clone(),
			collection: self.collection.clone(),
		}
	}
}

impl<D: SessionDriver> fmt::Debug for SessionManager<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionManager")
			.field("addresses", &self.slot.config.addresses)
			.field("database", &self.database)
			.field("collection", &self.collection)
			.field("connected", &self.is_connected())
			.field("closed", &self.is_closed())
			.finish()
	}
}

#[cfg(feature = "mongodb")]
impl SessionManager<MongoDriver> {
	/// Create a manager that dials MongoDB on first use
	///
	/// No network activity happens here. If `config.database` is set the
	/// manager starts with that database selected.
	///
	/// # Errors
	///
	/// Returns a configuration error if `config` fails validation.
	pub fn new(config: DialConfig) -> Result<Self> {
		Self::with_driver(MongoDriver::new(), config)
	}
}

impl<D: SessionDriver> SessionManager<D> {
	/// Create a manager over an arbitrary driver
	pub fn with_driver(driver: D, config: DialConfig) -> Result<Self> {
		config.validate()?;

		let database = config.database.clone();
		let manager = Self {
			slot: Arc::new(ConnectionSlot::new(driver, config)),
			database: None,
			collection: None,
		};

		match database {
			Some(name) => manager.with_database(&name),
			None => Ok(manager),
		}
	}

	/// Return a manager targeting database `name`
	///
	/// The collection selector is cleared because it belonged to the previous
	/// database; configure it again with [`with_collection`](Self::with_collection).
	pub fn with_database(&self, name: &str) -> Result<Self> {
		validate_database_name(name)?;

		Ok(Self {
			slot: Arc::clone(&self.slot),
			database: Some(name.to_string()),
			collection: None,
		})
	}

	/// Return a manager targeting collection `name` of the current database
	///
	/// # Errors
	///
	/// [`SessionError::DatabaseNotConfigured`] if no database has been
	/// selected yet.
	pub fn with_collection(&self, name: &str) -> Result<Self> {
		if self.database.is_none() {
			return Err(SessionError::DatabaseNotConfigured);
		}
		validate_collection_name(name)?;

		Ok(Self {
			slot: Arc::clone(&self.slot),
			database: self.database.clone(),
			collection: Some(name.to_string()),
		})
	}

	pub fn database_name(&self) -> Option<&str> {
		self.database.as_deref()
	}

	pub fn collection_name(&self) -> Option<&str> {
		self.collection.as_deref()
	}

	/// The configured database/collection pair
	pub fn target(&self) -> Result<Target> {
		let database = self
			.database
			.clone()
			.ok_or(SessionError::DatabaseNotConfigured)?;
		let collection = self
			.collection
			.clone()
			.ok_or(SessionError::CollectionNotConfigured)?;

		Ok(Target {
			database,
			collection,
		})
	}

	pub fn dial_config(&self) -> &DialConfig {
		&self.slot.config
	}

	/// Whether the shared base connection is established and open
	pub fn is_connected(&self) -> bool {
		self.slot.base.initialized() && !self.slot.is_closed()
	}

	pub fn is_closed(&self) -> bool {
		self.slot.is_closed()
	}

	/// Whether both managers belong to the same lineage
	pub fn shares_connection_with(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.slot, &other.slot)
	}

	async fn scoped_session(&self) -> Result<(ScopedSession<D>, &D::Connection)> {
		let base = self.slot.connection().await?;
		let session = self
			.slot
			.driver
			.clone_session(base)
			.await
			.map_err(SessionError::Session)?;
		tracing::trace!("cloned scoped session");

		Ok((ScopedSession::new(Arc::clone(&self.slot), session), base))
	}

	/// Run `query` against the configured collection on a fresh session
	///
	/// The base connection is dialed first if needed; when that fails the
	/// dial error is returned and `query` never runs. The cloned session is
	/// released on every exit path. Whatever `query` returns is passed through
	/// unchanged.
	///
	/// # Errors
	///
	/// Configuration errors if database or collection is missing, the dial or
	/// clone error, [`SessionError::Closed`] after [`close`](Self::close), or
	/// the query's own error.
	pub async fn execute<F, T, E>(&self, query: F) -> std::result::Result<T, E>
	where
		F: for<'s> FnOnce(&'s mut CollectionScope<D>) -> BoxFuture<'s, std::result::Result<T, E>>,
		E: From<SessionError>,
	{
		let target = self.target()?;
		let (session, base) = self.scoped_session().await?;
		let collection = self
			.slot
			.driver
			.collection(base, &target.database, &target.collection);

		tracing::debug!(namespace = %target.namespace(), "executing query");
		let mut scope = CollectionScope::new(collection, session, target);
		query(&mut scope).await
	}

	/// Check connectivity with a trivial ping on a fresh session
	///
	/// Selectors are not required.
	pub async fn ping(&self) -> Result<()> {
		let (mut session, base) = self.scoped_session().await?;
		self.slot
			.driver
			.ping(base, session.get_mut())
			.await
			.map_err(SessionError::Ping)
	}

	/// Close the shared base connection, if one was ever established
	///
	/// Affects every manager in the lineage. Later calls fail with
	/// [`SessionError::Closed`]. Closing twice is a no-op.
	pub async fn close(&self) {
		self.slot.close().await;
	}
}
