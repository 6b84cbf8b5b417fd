//! # mongoscope-db
//!
//! Session lifecycle management for MongoDB.
//!
//! A [`SessionManager`] holds a [`DialConfig`], a lazily dialed base
//! connection shared by every manager derived from it, and the database and
//! collection an operation targets. [`SessionManager::execute`] dials on first
//! use, clones a session for the call, hands the query function a
//! [`CollectionScope`] bound to that session, and releases the session on
//! every exit path.
//!
//! ## Feature Flags
//!
//! - `mongodb` (default) - [`MongoDriver`] and [`MongoSessionManager`] over the
//!   official `mongodb` crate
//!
//! Without `mongodb`, the manager is still usable with any
//! [`SessionDriver`] implementation.

pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod scope;
pub mod target;

pub use config::{ConfigError, DialConfig};
pub use driver::SessionDriver;
pub use error::{DriverError, NameKind, Result, SessionError};
pub use manager::SessionManager;
pub use scope::{CollectionScope, ScopedSession};
pub use target::Target;

#[cfg(feature = "mongodb")]
pub use driver::MongoDriver;
#[cfg(feature = "mongodb")]
pub use manager::MongoSessionManager;

/// Re-export of the driver crate so callers can name its types
#[cfg(feature = "mongodb")]
pub use mongodb;
