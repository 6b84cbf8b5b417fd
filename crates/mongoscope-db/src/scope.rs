//! Per-call session guard and the collection view handed to query functions

use std::fmt;
use std::sync::Arc;

use crate::driver::SessionDriver;
use crate::manager::ConnectionSlot;
use crate::target::Target;

/// A session cloned from the base connection for a single operation
///
/// The session goes back to the driver when the guard is dropped, which
/// covers normal return, error return, panics unwinding through the call and
/// futures dropped before completion.
pub struct ScopedSession<D: SessionDriver> {
	slot: Arc<ConnectionSlot<D>>,
	session: Option<D::Session>,
}

impl<D: SessionDriver> ScopedSession<D> {
	pub(crate) fn new(slot: Arc<ConnectionSlot<D>>, session: D::Session) -> Self {
		Self {
			slot,
			session: Some(session),
		}
	}

	/// Borrow the driver session
	pub fn get_mut(&mut self) -> &mut D::Session {
		// Only `Drop` takes the session out.
		self.session
			.as_mut()
			.unwrap_or_else(|| unreachable!("scoped session used after release"))
	}
}

impl<D: SessionDriver> Drop for ScopedSession<D> {
	fn drop(&mut self) {
		if let Some(session) = self.session.take() {
			self.slot.driver().release(session);
			tracing::trace!("released scoped session");
		}
	}
}

impl<D: SessionDriver> fmt::Debug for ScopedSession<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScopedSession")
			.field("active", &self.session.is_some())
			.finish()
	}
}

/// What a query function receives: a collection bound to a fresh session
///
/// The scope is only lent to the query function, so it cannot outlive the
/// call that owns the session.
///
/// # Example
///
/// ```rust,no_run
/// use mongoscope_db::{MongoSessionManager, SessionError};
/// use mongodb::bson::doc;
///
/// # async fn example(manager: MongoSessionManager) -> Result<(), SessionError> {
/// manager
/// 	.execute(|scope| {
/// 		Box::pin(async move {
/// 			let (items, session) = scope.split();
/// 			items
/// 				.insert_one(doc! { "id": "a" })
/// 				.session(session)
/// 				.await?;
/// 			Ok::<_, SessionError>(())
/// 		})
/// 	})
/// 	.await
/// # }
/// ```
pub struct CollectionScope<D: SessionDriver> {
	collection: D::Collection,
	session: ScopedSession<D>,
	target: Target,
}

impl<D: SessionDriver> CollectionScope<D> {
	pub(crate) fn new(collection: D::Collection, session: ScopedSession<D>, target: Target) -> Self {
		Self {
			collection,
			session,
			target,
		}
	}

	/// The configured collection
	pub fn collection(&self) -> &D::Collection {
		&self.collection
	}

	/// The session cloned for this call
	pub fn session(&mut self) -> &mut D::Session {
		self.session.get_mut()
	}

	/// Borrow the collection and the session at the same time
	pub fn split(&mut self) -> (&D::Collection, &mut D::Session) {
		(&self.collection, self.session.get_mut())
	}

	pub fn database_name(&self) -> &str {
		&self.target.database
	}

	pub fn collection_name(&self) -> &str {
		&self.target.collection
	}

	pub fn target(&self) -> &Target {
		&self.target
	}
}

impl<D: SessionDriver> fmt::Debug for CollectionScope<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CollectionScope")
			.field("target", &self.target)
			.field("session", &self.session)
			.finish()
	}
}
