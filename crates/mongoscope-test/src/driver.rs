//! In-memory [`SessionDriver`] that records every call
//!
//! Lets lifecycle tests count dials, clones and releases without a server.
//! Documents are kept per `database.collection` namespace in a shared store,
//! so a value written through one manager can be read through another.

use async_trait::async_trait;
use mongoscope_db::{DialConfig, DriverError, SessionDriver};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Errors produced by [`RecordingDriver`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockDriverError {
	#[error("no reachable servers")]
	Unreachable,

	#[error("{0}")]
	Ping(String),

	#[error("connection {0} is closed")]
	ConnectionClosed(u64),
}

#[derive(Default)]
struct Counters {
	dials: AtomicUsize,
	failed_dials: AtomicUsize,
	clones: AtomicUsize,
	releases: AtomicUsize,
	pings: AtomicUsize,
	closes: AtomicUsize,
}

#[derive(Default)]
struct Behaviour {
	dial_delay: Mutex<Duration>,
	failing_dials: AtomicUsize,
	ping_failure: Mutex<Option<String>>,
}

type Store = Arc<Mutex<HashMap<String, Vec<Value>>>>;

#[derive(Default)]
struct Inner {
	counters: Counters,
	behaviour: Behaviour,
	store: Store,
	next_id: AtomicU64,
	last_config: Mutex<Option<DialConfig>>,
}

/// Recording driver; clones share counters, behaviour and the document store
#[derive(Clone, Default)]
pub struct RecordingDriver {
	inner: Arc<Inner>,
}

impl RecordingDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make every dial take `delay` before completing
	pub fn with_dial_delay(self, delay: Duration) -> Self {
		*self.inner.behaviour.dial_delay.lock() = delay;
		self
	}

	/// Fail the next `count` dials with [`MockDriverError::Unreachable`]
	pub fn failing_dials(self, count: usize) -> Self {
		self.inner
			.behaviour
			.failing_dials
			.store(count, Ordering::SeqCst);
		self
	}

	/// Fail every ping with the given message
	pub fn with_ping_failure(self, message: impl Into<String>) -> Self {
		*self.inner.behaviour.ping_failure.lock() = Some(message.into());
		self
	}

	/// Successful dials
	pub fn dials(&self) -> usize {
		self.inner.counters.dials.load(Ordering::SeqCst)
	}

	pub fn failed_dials(&self) -> usize {
		self.inner.counters.failed_dials.load(Ordering::SeqCst)
	}

	pub fn clones(&self) -> usize {
		self.inner.counters.clones.load(Ordering::SeqCst)
	}

	pub fn releases(&self) -> usize {
		self.inner.counters.releases.load(Ordering::SeqCst)
	}

	/// Sessions cloned but not yet released
	pub fn open_sessions(&self) -> usize {
		self.clones() - self.releases()
	}

	pub fn pings(&self) -> usize {
		self.inner.counters.pings.load(Ordering::SeqCst)
	}

	pub fn closes(&self) -> usize {
		self.inner.counters.closes.load(Ordering::SeqCst)
	}

	/// The configuration passed to the most recent dial
	pub fn last_dial_config(&self) -> Option<DialConfig> {
		self.inner.last_config.lock().clone()
	}

	/// Documents stored under `database.collection`
	pub fn documents(&self, namespace: &str) -> Vec<Value> {
		self.inner
			.store
			.lock()
			.get(namespace)
			.cloned()
			.unwrap_or_default()
	}

	fn next_id(&self) -> u64 {
		self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1
	}
}

/// Base connection handed out by [`RecordingDriver`]
#[derive(Debug)]
pub struct MockConnection {
	id: u64,
	closed: AtomicBool,
}

impl MockConnection {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

/// Per-call session cloned from a [`MockConnection`]
#[derive(Debug)]
pub struct MockSession {
	id: u64,
	connection_id: u64,
	operations: usize,
}

impl MockSession {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn connection_id(&self) -> u64 {
		self.connection_id
	}

	/// Collection operations run through this session
	pub fn operations(&self) -> usize {
		self.operations
	}
}

/// Collection view bound to a [`MockConnection`]
#[derive(Debug, Clone)]
pub struct MockCollection {
	database: String,
	name: String,
	connection_id: u64,
	store: Store,
}

impl MockCollection {
	pub fn database_name(&self) -> &str {
		&self.database
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn connection_id(&self) -> u64 {
		self.connection_id
	}

	pub fn namespace(&self) -> String {
		format!("{}.{}", self.database, self.name)
	}

	pub fn insert_one(&self, session: &mut MockSession, document: Value) {
		session.operations += 1;
		self.store
			.lock()
			.entry(self.namespace())
			.or_default()
			.push(document);
	}

	/// First document whose `field` equals `value`
	pub fn find_one(&self, session: &mut MockSession, field: &str, value: &Value) -> Option<Value> {
		session.operations += 1;
		self.store
			.lock()
			.get(&self.namespace())
			.and_then(|docs| docs.iter().find(|doc| doc.get(field) == Some(value)).cloned())
	}

	pub fn count(&self, session: &mut MockSession) -> usize {
		session.operations += 1;
		self.store
			.lock()
			.get(&self.namespace())
			.map_or(0, Vec::len)
	}
}

#[async_trait]
impl SessionDriver for RecordingDriver {
	type Connection = MockConnection;
	type Session = MockSession;
	type Collection = MockCollection;

	async fn dial(&self, config: &DialConfig) -> Result<MockConnection, DriverError> {
		*self.inner.last_config.lock() = Some(config.clone());

		let delay = *self.inner.behaviour.dial_delay.lock();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		let failing = &self.inner.behaviour.failing_dials;
		if failing
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok()
		{
			self.inner.counters.failed_dials.fetch_add(1, Ordering::SeqCst);
			return Err(DriverError::new(MockDriverError::Unreachable));
		}

		self.inner.counters.dials.fetch_add(1, Ordering::SeqCst);
		let connection = MockConnection {
			id: self.next_id(),
			closed: AtomicBool::new(false),
		};
		tracing::debug!(connection = connection.id, "mock connection dialed");
		Ok(connection)
	}

	async fn clone_session(&self, base: &MockConnection) -> Result<MockSession, DriverError> {
		if base.is_closed() {
			return Err(DriverError::new(MockDriverError::ConnectionClosed(base.id)));
		}

		self.inner.counters.clones.fetch_add(1, Ordering::SeqCst);
		Ok(MockSession {
			id: self.next_id(),
			connection_id: base.id,
			operations: 0,
		})
	}

	fn collection(&self, base: &MockConnection, database: &str, name: &str) -> MockCollection {
		MockCollection {
			database: database.to_string(),
			name: name.to_string(),
			connection_id: base.id,
			store: Arc::clone(&self.inner.store),
		}
	}

	async fn ping(
		&self,
		_base: &MockConnection,
		_session: &mut MockSession,
	) -> Result<(), DriverError> {
		self.inner.counters.pings.fetch_add(1, Ordering::SeqCst);
		let failure = self.inner.behaviour.ping_failure.lock().clone();
		match failure {
			Some(message) => Err(DriverError::new(MockDriverError::Ping(message))),
			None => Ok(()),
		}
	}

	fn release(&self, _session: MockSession) {
		self.inner.counters.releases.fetch_add(1, Ordering::SeqCst);
	}

	async fn close(&self, base: &MockConnection) {
		base.closed.store(true, Ordering::SeqCst);
		self.inner.counters.closes.fetch_add(1, Ordering::SeqCst);
	}
}
