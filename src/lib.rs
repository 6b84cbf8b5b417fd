//! # mongoscope
//!
//! A thin session manager for MongoDB.
//!
//! One [`SessionManager`] per application owns the dial settings and a single
//! base connection, dialed lazily on first use and shared by every manager
//! derived from it. Each [`execute`](SessionManager::execute) call clones a
//! session from that base, hands the query a collection bound to the session,
//! and releases the session when the call ends, whether the query succeeded,
//! failed, panicked or was cancelled.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mongoscope::prelude::*;
//! use mongoscope::mongodb::bson::doc;
//!
//! # async fn run() -> Result<(), SessionError> {
//! let manager = MongoSessionManager::new(DialConfig::new(["localhost:27017"]))?;
//! let items = manager.with_database("shop")?.with_collection("items")?;
//!
//! items
//! 	.execute(|scope| {
//! 		Box::pin(async move {
//! 			let (coll, session) = scope.split();
//! 			coll.insert_one(doc! { "sku": "a-1" }).session(session).await?;
//! 			Ok::<_, SessionError>(())
//! 		})
//! 	})
//! 	.await?;
//!
//! manager.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `mongodb` (default) - the official MongoDB driver backend
//! - `test` - [`test`] module with the recording driver and fixtures
//! - `testcontainers` - MongoDB container fixtures (implies `test`)

pub use mongoscope_db::{
	CollectionScope, ConfigError, DialConfig, DriverError, NameKind, Result, ScopedSession,
	SessionDriver, SessionError, SessionManager, Target,
};

#[cfg(feature = "mongodb")]
pub use mongoscope_db::{MongoDriver, MongoSessionManager, mongodb};

pub mod config {
	//! Dial settings and configuration file loading
	pub use mongoscope_db::config::*;
}

pub mod driver {
	//! Driver seam between the session manager and a MongoDB client
	pub use mongoscope_db::driver::*;
}

#[cfg(feature = "test")]
pub use mongoscope_test as test;

/// Commonly used types
pub mod prelude {
	pub use crate::{
		CollectionScope, DialConfig, SessionDriver, SessionError, SessionManager, Target,
	};

	#[cfg(feature = "mongodb")]
	pub use crate::{MongoDriver, MongoSessionManager};
}
