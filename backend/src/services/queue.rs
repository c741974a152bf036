//! Offline write queue
//!
//! Batches that could not reach the remote collection are kept as an ordered
//! JSON list under a single key-value slot. Every read-modify-write of the
//! slot holds the queue mutex, so concurrent enqueues never lose an update.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use shared::NewBatch;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::services::batch_store::RemoteBatchStore;
use crate::storage::{KeyValueStore, KvError};

/// Slot holding unsynced batches
pub const DEFAULT_QUEUE_KEY: &str = "unsynced_batches";

/// A pending remote write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueuedWrite {
    pub local_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub payload: NewBatch,
}

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub committed: usize,
    pub failed: usize,
    /// Entries left in the slot after removal, including any enqueued mid-drain
    pub remaining: usize,
}

pub struct OfflineQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
    lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Vec<QueuedWrite>, KvError> {
        match self.store.get(&self.key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| KvError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, entries: &[QueuedWrite]) -> Result<(), KvError> {
        if entries.is_empty() {
            return self.store.delete(&self.key).await;
        }
        let bytes =
            serde_json::to_vec(entries).map_err(|e| KvError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &bytes).await
    }

    /// Append a record, returning its local id
    pub async fn enqueue(&self, payload: NewBatch) -> Result<Uuid, KvError> {
        let _guard = self.lock.lock().await;

        let mut entries = self.read().await?;
        let local_id = Uuid::new_v4();
        entries.push(QueuedWrite {
            local_id,
            enqueued_at: Utc::now(),
            payload,
        });
        self.write(&entries).await?;

        tracing::debug!(%local_id, pending = entries.len(), "Batch queued offline");
        Ok(local_id)
    }

    /// Pending records in insertion order
    pub async fn list(&self) -> Result<Vec<QueuedWrite>, KvError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn pending_count(&self) -> Result<usize, KvError> {
        Ok(self.list().await?.len())
    }

    /// Remove records by local id. Unknown ids are ignored.
    pub async fn remove(&self, local_ids: &[Uuid]) -> Result<usize, KvError> {
        let _guard = self.lock.lock().await;

        let ids: HashSet<&Uuid> = local_ids.iter().collect();
        let mut entries = self.read().await?;
        entries.retain(|e| !ids.contains(&e.local_id));
        self.write(&entries).await?;
        Ok(entries.len())
    }

    /// Commit every pending record to `remote` in parallel, then remove the
    /// committed ones. Failed records stay queued for the next drain.
    ///
    /// The slot is not locked while commits are in flight; removal re-reads
    /// it, so records enqueued meanwhile are kept.
    pub async fn drain(&self, remote: &dyn RemoteBatchStore) -> Result<DrainReport, KvError> {
        let snapshot = self.list().await?;
        if snapshot.is_empty() {
            return Ok(DrainReport::default());
        }

        tracing::info!("Syncing {} batches...", snapshot.len());

        let results = join_all(
            snapshot
                .iter()
                .map(|entry| remote.insert(entry.payload.clone(), Some(entry.local_id))),
        )
        .await;

        let mut committed = Vec::with_capacity(snapshot.len());
        for (entry, result) in snapshot.iter().zip(results) {
            match result {
                Ok(batch) => {
                    tracing::debug!(local_id = %entry.local_id, batch_id = %batch.id, "Queued batch committed");
                    committed.push(entry.local_id);
                }
                Err(e) => {
                    tracing::warn!(local_id = %entry.local_id, error = %e, "Queued batch failed to commit");
                }
            }
        }

        let remaining = self.remove(&committed).await?;
        let report = DrainReport {
            committed: committed.len(),
            failed: snapshot.len() - committed.len(),
            remaining,
        };

        tracing::info!(
            committed = report.committed,
            failed = report.failed,
            remaining = report.remaining,
            "Sync pass finished"
        );
        Ok(report)
    }
}
