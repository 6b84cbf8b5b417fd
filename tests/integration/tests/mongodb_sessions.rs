//! MongoDB Session Manager Tests
//!
//! Runs the session manager against a real MongoDB container.

use futures::TryStreamExt;
use mongoscope::mongodb::bson::{Document, doc};
use mongoscope::prelude::*;
use mongoscope_integration_tests::unique_collection;
use mongoscope_test::fixtures::mongodb_manager;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use testcontainers::{ContainerAsync, GenericImage};

/// Test MongoDB connectivity through ping
///
/// This test verifies that:
/// 1. The manager dials lazily on first ping
/// 2. Ping succeeds against a reachable server
#[rstest]
#[tokio::test]
async fn test_ping_reachable_server(
	#[future] mongodb_manager: (ContainerAsync<GenericImage>, MongoSessionManager),
) {
	// Arrange
	let (_container, manager) = mongodb_manager.await;
	assert!(!manager.is_connected());

	// Act
	let result = manager.ping().await;

	// Assert
	assert!(result.is_ok(), "ping failed: {:?}", result);
	assert!(manager.is_connected());

	manager.close().await;
}

/// Test insert then read through two executes
///
/// This test verifies that:
/// 1. A document inserted in one execute is visible to the next
/// 2. The query runs against the configured database and collection
#[rstest]
#[tokio::test]
async fn test_insert_then_find(
	#[future] mongodb_manager: (ContainerAsync<GenericImage>, MongoSessionManager),
) {
	let (_container, manager) = mongodb_manager.await;
	let items = manager
		.with_database("testdb")
		.unwrap()
		.with_collection("items")
		.unwrap();

	// Act: insert
	items
		.execute(|scope| {
			Box::pin(async move {
				let (coll, session) = scope.split();
				coll.insert_one(doc! { "id": "a" }).session(session).await?;
				Ok::<_, SessionError>(())
			})
		})
		.await
		.unwrap();

	// Act: read back
	let found = items
		.execute(|scope| {
			Box::pin(async move {
				let (coll, session) = scope.split();
				let found = coll.find_one(doc! { "id": "a" }).session(session).await?;
				Ok::<_, SessionError>(found)
			})
		})
		.await
		.unwrap();

	// Assert
	let found = found.expect("inserted document should be found");
	assert_eq!(found.get_str("id").unwrap(), "a");

	// Cleanup
	items
		.execute(|scope| {
			Box::pin(async move {
				scope.collection().drop().await?;
				Ok::<_, SessionError>(())
			})
		})
		.await
		.unwrap();
	manager.close().await;
}

/// Test that derived managers route to their own collections
#[rstest]
#[tokio::test]
async fn test_derived_managers_route_independently(
	#[future] mongodb_manager: (ContainerAsync<GenericImage>, MongoSessionManager),
) {
	let (_container, manager) = mongodb_manager.await;
	let db = manager.with_database("routing").unwrap();
	let left = db.with_collection(&unique_collection("left")).unwrap();
	let right = db.with_collection(&unique_collection("right")).unwrap();

	left.execute(|scope| {
		Box::pin(async move {
			let (coll, session) = scope.split();
			coll.insert_many([doc! { "n": 1 }, doc! { "n": 2 }])
				.session(session)
				.await?;
			Ok::<_, SessionError>(())
		})
	})
	.await
	.unwrap();

	let count = |m: MongoSessionManager| async move {
		m.execute(|scope| {
			Box::pin(async move {
				let (coll, session) = scope.split();
				let n = coll
					.count_documents(doc! {})
					.session(session)
					.await?;
				Ok::<_, SessionError>(n)
			})
		})
		.await
		.unwrap()
	};

	assert_eq!(count(left.clone()).await, 2);
	assert_eq!(count(right.clone()).await, 0);
	assert!(left.shares_connection_with(&right));

	manager.close().await;
}

/// Test concurrent executes on a fresh manager
#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executes(
	#[future] mongodb_manager: (ContainerAsync<GenericImage>, MongoSessionManager),
) {
	let (_container, manager) = mongodb_manager.await;
	let items = manager
		.with_database("testdb")
		.unwrap()
		.with_collection(&unique_collection("concurrent"))
		.unwrap();
	let completed = Arc::new(AtomicUsize::new(0));

	let handles: Vec<_> = (0..16)
		.map(|i| {
			let items = items.clone();
			let completed = Arc::clone(&completed);
			tokio::spawn(async move {
				items
					.execute(move |scope| {
						Box::pin(async move {
							let (coll, session) = scope.split();
							coll.insert_one(doc! { "worker": i }).session(session).await?;
							completed.fetch_add(1, Ordering::SeqCst);
							Ok::<_, SessionError>(())
						})
					})
					.await
			})
		})
		.collect();

	for handle in handles {
		handle.await.unwrap().unwrap();
	}

	let workers: Vec<Document> = items
		.execute(|scope| {
			Box::pin(async move {
				let (coll, session) = scope.split();
				let mut cursor = coll.find(doc! {}).session(&mut *session).await?;
				let docs: Vec<Document> = cursor.stream(session).try_collect().await?;
				Ok::<_, SessionError>(docs)
			})
		})
		.await
		.unwrap();

	assert_eq!(completed.load(Ordering::SeqCst), 16);
	assert_eq!(workers.len(), 16);

	manager.close().await;
}

/// Test that operations after close are rejected
#[rstest]
#[tokio::test]
async fn test_execute_after_close(
	#[future] mongodb_manager: (ContainerAsync<GenericImage>, MongoSessionManager),
) {
	let (_container, manager) = mongodb_manager.await;
	manager.ping().await.unwrap();

	manager.close().await;

	assert!(matches!(manager.ping().await, Err(SessionError::Closed)));
}
