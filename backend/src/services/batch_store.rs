//! Batch store
//!
//! Wraps the remote batch collection with a live projection. The projection
//! holds the owner's committed batches plus any records still waiting in the
//! offline queue (`synced: false`), newest first.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Batch, BatchStatus, NewBatch};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::queue::OfflineQueue;

/// The authoritative batch collection
#[async_trait]
pub trait RemoteBatchStore: Send + Sync {
    /// Short name of the backend, reported by the health check
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;

    /// Insert a batch. `local_id` links a record to its offline queue entry.
    async fn insert(&self, batch: NewBatch, local_id: Option<Uuid>) -> AppResult<Batch>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Batch>>;

    async fn update_status(
        &self,
        id: Uuid,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch>;

    /// All batches of one owner, newest first
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Batch>>;
}

/// Upper bound on a single remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounds every call to the wrapped remote, so a hung connection surfaces as
/// `AppError::Remote` instead of blocking the caller
struct TimedRemote {
    inner: Arc<dyn RemoteBatchStore>,
    timeout: Duration,
}

impl TimedRemote {
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        tokio::time::timeout(self.timeout, call).await.map_err(|_| {
            AppError::Remote(format!(
                "{} timed out after {}ms",
                operation,
                self.timeout.as_millis()
            ))
        })?
    }
}

#[async_trait]
impl RemoteBatchStore for TimedRemote {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn ping(&self) -> AppResult<()> {
        self.bounded("ping", self.inner.ping()).await
    }

    async fn insert(&self, batch: NewBatch, local_id: Option<Uuid>) -> AppResult<Batch> {
        self.bounded("insert", self.inner.insert(batch, local_id)).await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Batch>> {
        self.bounded("get", self.inner.get(id)).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch> {
        self.bounded(
            "update_status",
            self.inner.update_status(id, status, completed_at),
        )
        .await
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Batch>> {
        self.bounded("list_by_owner", self.inner.list_by_owner(user_id))
            .await
    }
}

pub struct BatchStore {
    remote: Arc<dyn RemoteBatchStore>,
    queue: Arc<OfflineQueue>,
    owner: Uuid,
    tx: watch::Sender<Vec<Batch>>,
}

impl BatchStore {
    pub fn new(remote: Arc<dyn RemoteBatchStore>, queue: Arc<OfflineQueue>, owner: Uuid) -> Self {
        Self::with_remote_timeout(remote, queue, owner, DEFAULT_REMOTE_TIMEOUT)
    }

    pub fn with_remote_timeout(
        remote: Arc<dyn RemoteBatchStore>,
        queue: Arc<OfflineQueue>,
        owner: Uuid,
        timeout: Duration,
    ) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            remote: Arc::new(TimedRemote {
                inner: remote,
                timeout,
            }),
            queue,
            owner,
            tx,
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteBatchStore> {
        &self.remote
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Live stream of the owner's batches
    pub fn subscribe(&self) -> watch::Receiver<Vec<Batch>> {
        self.tx.subscribe()
    }

    /// Latest projection
    pub fn current(&self) -> Vec<Batch> {
        self.tx.borrow().clone()
    }

    /// Rebuild the projection from the remote collection and the queue.
    ///
    /// An unreachable remote keeps the last committed batches; an unreadable
    /// queue drops its entries from this round only.
    pub async fn refresh(&self) {
        let committed = match self.remote.list_by_owner(self.owner).await {
            Ok(batches) => batches,
            Err(e) => {
                tracing::warn!(error = %e, "Remote batch list unavailable, keeping last snapshot");
                self.committed_snapshot()
            }
        };
        self.publish(committed).await;
    }

    /// Rebuild the projection from the last committed snapshot and the queue
    /// without contacting the remote collection
    pub async fn refresh_local(&self) {
        let committed = self.committed_snapshot();
        self.publish(committed).await;
    }

    async fn publish(&self, committed: Vec<Batch>) {
        let pending = match self.queue.list().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Offline queue unreadable");
                Vec::new()
            }
        };

        let mut batches: Vec<Batch> = pending
            .into_iter()
            .filter(|entry| entry.payload.user_id == self.owner)
            .map(|entry| entry.payload.into_batch(entry.local_id, Some(entry.local_id), false))
            .chain(committed)
            .collect();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(count = batches.len(), "Batch projection refreshed");
        self.tx.send_replace(batches);
    }

    fn committed_snapshot(&self) -> Vec<Batch> {
        self.tx.borrow().iter().filter(|b| b.synced).cloned().collect()
    }

    /// Mark a batch as being processed
    pub async fn start_processing(&self, id: Uuid) -> AppResult<Batch> {
        self.transition(id, BatchStatus::Processing).await
    }

    /// Close out a batch. Completed batches are no longer risk-monitored.
    pub async fn complete_batch(&self, id: Uuid) -> AppResult<Batch> {
        self.transition(id, BatchStatus::Completed).await
    }

    async fn transition(&self, id: Uuid, next: BatchStatus) -> AppResult<Batch> {
        let batch = self
            .remote
            .get(id)
            .await?
            .filter(|b| b.user_id == self.owner)
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        if !batch.status.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "{} -> {}",
                batch.status, next
            )));
        }

        let completed_at = (next == BatchStatus::Completed).then(Utc::now);
        let updated = self.remote.update_status(id, next, completed_at).await?;

        tracing::info!(batch_id = %id, from = %batch.status, to = %next, "Batch status changed");
        self.refresh().await;
        Ok(updated)
    }
}
