//! Shared helpers for the mongoscope integration tests
//!
//! The tests themselves live under `tests/`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Collection name unique within this test process
///
/// Tests sharing a container must not see each other's documents.
pub fn unique_collection(prefix: &str) -> String {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0, |d| d.subsec_nanos());
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	format!("{}_{}_{}", prefix, nanos, seq)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unique_collection_names_differ() {
		let a = unique_collection("items");
		let b = unique_collection("items");

		assert_ne!(a, b);
		assert!(a.starts_with("items_"));
	}
}
