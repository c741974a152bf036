//! Offline sync tests
//!
//! Tests for the save path and queue draining including:
//! - Offline saves land in the queue and show up unsynced
//! - Reconnection drains the queue
//! - Partial drain failures stay queued
//! - Only one drain runs at a time
//! - The connectivity listener is removed on shutdown
//! - A stalled remote never blocks a save or wedges the drain flag

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use postharvest_backend::error::{AppError, AppResult};
use postharvest_backend::services::{
    BatchStore, NetworkMonitor, OfflineQueue, RemoteBatchStore, SyncCoordinator, SyncMode,
};
use postharvest_backend::storage::{FileStore, InMemoryBatchStore, KeyValueStore, MemoryStore};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{Batch, BatchDraft, BatchStatus, NewBatch};
use tokio::sync::Semaphore;
use uuid::Uuid;

fn draft(crop: &str) -> BatchDraft {
    BatchDraft {
        crop_type: crop.to_string(),
        weight_kg: Decimal::from(350),
        harvest_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        storage_location: "Bogura".to_string(),
        storage_type: "Jute Bags".to_string(),
        moisture_content: Some(Decimal::from(15)),
    }
}

struct Harness {
    coordinator: Arc<SyncCoordinator>,
    network: Arc<NetworkMonitor>,
    batches: Arc<BatchStore>,
    queue: Arc<OfflineQueue>,
}

fn harness_with(
    online: bool,
    remote: Arc<dyn RemoteBatchStore>,
    kv: Arc<dyn KeyValueStore>,
) -> Harness {
    harness_timed(online, remote, kv, Duration::from_secs(10))
}

fn harness_timed(
    online: bool,
    remote: Arc<dyn RemoteBatchStore>,
    kv: Arc<dyn KeyValueStore>,
    remote_timeout: Duration,
) -> Harness {
    let queue = Arc::new(OfflineQueue::new(kv, "unsynced_batches"));
    let batches = Arc::new(BatchStore::with_remote_timeout(
        remote,
        queue.clone(),
        Uuid::new_v4(),
        remote_timeout,
    ));
    let network = Arc::new(NetworkMonitor::new(online));
    let coordinator = Arc::new(SyncCoordinator::new(
        batches.clone(),
        queue.clone(),
        network.clone(),
    ));
    Harness {
        coordinator,
        network,
        batches,
        queue,
    }
}

fn harness(online: bool, remote: Arc<InMemoryBatchStore>) -> Harness {
    harness_with(online, remote, Arc::new(MemoryStore::new()))
}

async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Remote whose inserts wait for a permit
struct GatedRemote {
    inner: InMemoryBatchStore,
    gate: Semaphore,
}

impl GatedRemote {
    fn new() -> Self {
        Self {
            inner: InMemoryBatchStore::new(),
            gate: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl RemoteBatchStore for GatedRemote {
    fn backend(&self) -> &'static str {
        "gated"
    }

    async fn ping(&self) -> AppResult<()> {
        self.inner.ping().await
    }

    async fn insert(&self, batch: NewBatch, local_id: Option<Uuid>) -> AppResult<Batch> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        permit.forget();
        self.inner.insert(batch, local_id).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Batch>> {
        self.inner.get(id).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch> {
        self.inner.update_status(id, status, completed_at).await
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Batch>> {
        self.inner.list_by_owner(user_id).await
    }
}

/// Remote whose calls never complete, like a dead connection
struct HangingRemote;

#[async_trait]
impl RemoteBatchStore for HangingRemote {
    fn backend(&self) -> &'static str {
        "hanging"
    }

    async fn ping(&self) -> AppResult<()> {
        std::future::pending().await
    }

    async fn insert(&self, _batch: NewBatch, _local_id: Option<Uuid>) -> AppResult<Batch> {
        std::future::pending().await
    }

    async fn get(&self, _id: Uuid) -> AppResult<Option<Batch>> {
        std::future::pending().await
    }

    async fn update_status(
        &self,
        _id: Uuid,
        _status: BatchStatus,
        _completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch> {
        std::future::pending().await
    }

    async fn list_by_owner(&self, _user_id: Uuid) -> AppResult<Vec<Batch>> {
        std::future::pending().await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Saving offline queues the batch and shows it unsynced
    #[tokio::test]
    async fn test_offline_save_is_queued() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(false, remote.clone());

        let before = h.coordinator.pending_count().await.unwrap();
        let outcome = h.coordinator.save_batch(draft("Potato")).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.mode, SyncMode::Offline);
        assert!(outcome.local_id.is_some());
        assert_eq!(h.coordinator.pending_count().await.unwrap(), before + 1);
        assert!(remote.is_empty().await);

        let projected = h.batches.current();
        assert_eq!(projected.len(), 1);
        assert!(!projected[0].synced);
        assert_eq!(Some(projected[0].id), outcome.local_id);
    }

    /// Saving online writes straight to the remote
    #[tokio::test]
    async fn test_online_save_goes_remote() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(true, remote.clone());

        let outcome = h.coordinator.save_batch(draft("Rice")).await.unwrap();

        assert_eq!(outcome.mode, SyncMode::Online);
        assert!(outcome.batch_id.is_some());
        assert_eq!(remote.len().await, 1);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 0);
        assert!(h.batches.current()[0].synced);
    }

    /// A failed direct write falls back to the queue
    #[tokio::test]
    async fn test_online_failure_falls_back() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(true, remote.clone());
        remote.fail_next(1);

        let outcome = h.coordinator.save_batch(draft("Wheat")).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.mode, SyncMode::Offline);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 1);
    }

    /// Invalid drafts are rejected before anything is written
    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(true, remote.clone());
        let mut bad = draft("Maize");
        bad.weight_kg = Decimal::ZERO;

        let err = h.coordinator.save_batch(bad).await.unwrap_err();

        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "weightKg"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(remote.is_empty().await);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 0);
    }

    /// Reconnecting drains every queued batch
    #[tokio::test]
    async fn test_reconnect_drains_queue() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(false, remote.clone());
        h.coordinator.start().await;

        h.coordinator.save_batch(draft("Onion")).await.unwrap();
        h.coordinator.save_batch(draft("Mustard")).await.unwrap();
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 2);

        h.network.set_online(true).await;

        let queue = h.queue.clone();
        assert!(wait_until(|| {
            let queue = queue.clone();
            async move { queue.pending_count().await.unwrap() == 0 }
        })
        .await);
        assert_eq!(remote.len().await, 2);
        let batches = &h.batches;
        assert!(wait_until(|| async move { batches.current().iter().all(|b| b.synced) }).await);

        h.coordinator.shutdown().await;
    }

    /// Records that fail to commit stay queued for the next drain
    #[tokio::test]
    async fn test_partial_failure_keeps_entries() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(false, remote.clone());

        for crop in ["Rice", "Wheat", "Maize"] {
            h.coordinator.save_batch(draft(crop)).await.unwrap();
        }
        remote.fail_next(2);
        h.network.set_online(true).await;

        let report = h.coordinator.sync_now().await.unwrap();
        assert_eq!(report.committed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.remaining, 2);

        let retry = h.coordinator.sync_now().await.unwrap();
        assert_eq!(retry.committed, 2);
        assert_eq!(retry.remaining, 0);
    }

    /// Manual sync is refused while offline
    #[tokio::test]
    async fn test_sync_now_offline() {
        let h = harness(false, Arc::new(InMemoryBatchStore::new()));
        assert!(matches!(
            h.coordinator.sync_now().await.unwrap_err(),
            AppError::Offline
        ));
    }

    /// A second drain is refused while one is in flight, and writes queued
    /// during the drain survive it
    #[tokio::test]
    async fn test_single_drain_and_mid_drain_enqueue() {
        let remote = Arc::new(GatedRemote::new());
        let h = harness_with(false, remote.clone(), Arc::new(MemoryStore::new()));
        h.coordinator.save_batch(draft("Potato")).await.unwrap();

        let coordinator = h.coordinator.clone();
        let first = tokio::spawn(async move { coordinator.drain().await });
        let watched = &h.coordinator;
        assert!(wait_until(|| async move { watched.is_syncing() }).await);

        assert!(matches!(
            h.coordinator.drain().await.unwrap_err(),
            AppError::SyncInProgress
        ));
        h.coordinator.save_batch(draft("Onion")).await.unwrap();

        remote.gate.add_permits(1);
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.committed, 1);
        assert_eq!(report.remaining, 1);
        assert!(!h.coordinator.is_syncing());

        let pending = h.queue.list().await.unwrap();
        assert_eq!(pending[0].payload.crop_type, "Onion");
    }

    /// Shutdown removes the listener; later reconnections do nothing
    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let remote = Arc::new(InMemoryBatchStore::new());
        let h = harness(false, remote.clone());
        h.coordinator.start().await;
        assert_eq!(h.network.listener_count().await, 1);

        h.coordinator.shutdown().await;
        assert_eq!(h.network.listener_count().await, 0);

        h.coordinator.save_batch(draft("Rice")).await.unwrap();
        h.network.set_online(true).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 1);
        assert!(remote.is_empty().await);
    }

    /// An offline save returns without waiting on an unreachable remote
    #[tokio::test]
    async fn test_offline_save_never_waits_on_remote() {
        let h = harness_timed(
            false,
            Arc::new(HangingRemote),
            Arc::new(MemoryStore::new()),
            Duration::from_secs(3600),
        );

        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            h.coordinator.save_batch(draft("Potato")),
        )
        .await
        .expect("offline save blocked on the remote")
        .unwrap();

        assert_eq!(outcome.mode, SyncMode::Offline);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 1);
        assert_eq!(h.batches.current().len(), 1);
    }

    /// A stalled remote while online times out and falls back to the queue
    #[tokio::test]
    async fn test_stalled_remote_falls_back_offline() {
        let h = harness_timed(
            true,
            Arc::new(HangingRemote),
            Arc::new(MemoryStore::new()),
            Duration::from_millis(100),
        );

        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            h.coordinator.save_batch(draft("Rice")),
        )
        .await
        .expect("save blocked on the remote")
        .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.mode, SyncMode::Offline);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 1);
    }

    /// A drain against a stalled remote finishes and releases the drain flag
    #[tokio::test]
    async fn test_stalled_drain_releases_flag() {
        let h = harness_timed(
            false,
            Arc::new(HangingRemote),
            Arc::new(MemoryStore::new()),
            Duration::from_millis(100),
        );
        h.coordinator.save_batch(draft("Wheat")).await.unwrap();
        h.network.set_online(true).await;

        let report = tokio::time::timeout(Duration::from_secs(2), h.coordinator.sync_now())
            .await
            .expect("drain blocked on the remote")
            .unwrap();
        assert_eq!(report.committed, 0);
        assert_eq!(report.failed, 1);
        assert!(!h.coordinator.is_syncing());

        let retry = h.coordinator.sync_now().await.unwrap();
        assert_eq!(retry.failed, 1);
        assert_eq!(h.coordinator.pending_count().await.unwrap(), 1);
    }

    /// Queued batches survive a restart with the file store
    #[tokio::test]
    async fn test_file_queue_survives_restart() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let kv = Arc::new(FileStore::open(dir.path()).await.unwrap());
            let h = harness_with(false, Arc::new(InMemoryBatchStore::new()), kv);
            h.coordinator.save_batch(draft("Wheat")).await.unwrap();
        }

        let kv = Arc::new(FileStore::open(dir.path()).await.unwrap());
        let queue = OfflineQueue::new(kv, "unsynced_batches");
        let pending = queue.list().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payload.crop_type, "Wheat");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn crop_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["Rice", "Wheat", "Maize", "Potato", "Onion", "Mustard"])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Every offline save adds exactly one entry; a clean drain empties the queue
        #[test]
        fn prop_offline_saves_then_drain(crops in prop::collection::vec(crop_strategy(), 1..12)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let remote = Arc::new(InMemoryBatchStore::new());
                let h = harness(false, remote.clone());

                for (i, crop) in crops.iter().enumerate() {
                    h.coordinator.save_batch(draft(crop)).await.unwrap();
                    assert_eq!(h.coordinator.pending_count().await.unwrap(), i + 1);
                }

                h.network.set_online(true).await;
                let report = h.coordinator.sync_now().await.unwrap();
                assert_eq!(report.committed, crops.len());
                assert_eq!(report.remaining, 0);
                assert_eq!(remote.len().await, crops.len());
            });
        }

        /// Failed commits are exactly the ones left behind
        #[test]
        fn prop_failed_commits_remain(total in 1usize..10, failures in 0usize..10) {
            let failures = failures.min(total);
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let remote = Arc::new(InMemoryBatchStore::new());
                let h = harness(false, remote.clone());
                for _ in 0..total {
                    h.coordinator.save_batch(draft("Rice")).await.unwrap();
                }

                remote.fail_next(failures);
                h.network.set_online(true).await;
                let report = h.coordinator.sync_now().await.unwrap();

                assert_eq!(report.failed, failures);
                assert_eq!(report.committed, total - failures);
                assert_eq!(h.coordinator.pending_count().await.unwrap(), failures);
            });
        }
    }
}
