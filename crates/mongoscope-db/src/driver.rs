//! Driver seam
//!
//! The session manager only sequences calls; everything that touches the
//! network goes through a [`SessionDriver`]. The MongoDB implementation lives
//! in [`mongodb`] (behind the `mongodb` feature), and test doubles implement
//! the same trait.

use async_trait::async_trait;

use crate::config::DialConfig;
use crate::error::DriverError;

#[cfg(feature = "mongodb")]
pub mod mongodb;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoDriver;

/// Operations the session manager needs from a database driver
///
/// - `Connection`: the long-lived base connection, dialed once per lineage
/// - `Session`: an independent per-call handle cloned from the connection
/// - `Collection`: a collection view bound to the connection
#[async_trait]
pub trait SessionDriver: Send + Sync + 'static {
	type Connection: Send + Sync + 'static;
	type Session: Send + 'static;
	type Collection: Send + Sync + 'static;

	/// Establish the base connection
	async fn dial(&self, config: &DialConfig) -> Result<Self::Connection, DriverError>;

	/// Derive a per-call session from the base connection
	async fn clone_session(&self, base: &Self::Connection) -> Result<Self::Session, DriverError>;

	/// Bind a collection view to the base connection
	fn collection(&self, base: &Self::Connection, database: &str, name: &str)
	-> Self::Collection;

	/// Send a liveness probe over the session
	async fn ping(
		&self,
		base: &Self::Connection,
		session: &mut Self::Session,
	) -> Result<(), DriverError>;

	/// Give a per-call session back to the driver
	///
	/// Runs from `Drop`, so it must not block or fail.
	fn release(&self, session: Self::Session);

	/// Close the base connection and everything pooled behind it
	async fn close(&self, base: &Self::Connection);
}
