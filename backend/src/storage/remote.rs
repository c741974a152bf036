//! In-memory remote batch collection
//!
//! Used when no database URL is configured and in tests. Faults can be
//! injected to exercise the offline fallback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Batch, BatchStatus, NewBatch};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch_store::RemoteBatchStore;

#[derive(Default)]
pub struct InMemoryBatchStore {
    batches: RwLock<Vec<Batch>>,
    failing: AtomicBool,
    fail_next: AtomicUsize,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call until cleared
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail the next `n` inserts
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Remote("remote store unreachable".to_string()));
        }
        Ok(())
    }

    fn take_injected_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RemoteBatchStore for InMemoryBatchStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }

    async fn insert(&self, batch: NewBatch, local_id: Option<Uuid>) -> AppResult<Batch> {
        self.check_available()?;
        if self.take_injected_failure() {
            return Err(AppError::Remote("write rejected".to_string()));
        }

        let batch = batch.into_batch(Uuid::new_v4(), local_id, true);
        tracing::debug!(batch_id = %batch.id, ?local_id, "Batch stored in memory");
        self.batches.write().await.push(batch.clone());
        Ok(batch)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Batch>> {
        self.check_available()?;
        Ok(self.batches.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BatchStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<Batch> {
        self.check_available()?;
        let mut batches = self.batches.write().await;
        let batch = batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;
        batch.status = status;
        batch.completed_at = completed_at;
        Ok(batch.clone())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Batch>> {
        self.check_available()?;
        let mut batches: Vec<Batch> = self
            .batches
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record() -> NewBatch {
        NewBatch {
            crop_type: "Maize".to_string(),
            weight_kg: Decimal::from(120),
            harvest_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            storage_location: "Dinajpur".to_string(),
            storage_type: "Drum".to_string(),
            moisture_content: Some(Decimal::from(14)),
            status: BatchStatus::Active,
            created_at: Utc::now(),
            user_id: Uuid::nil(),
        }
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let store = InMemoryBatchStore::new();
        store.fail_next(2);

        assert!(store.insert(record(), None).await.is_err());
        assert!(store.insert(record(), None).await.is_err());
        let batch = store.insert(record(), None).await.unwrap();
        assert!(batch.synced);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_failing_blocks_every_call() {
        let store = InMemoryBatchStore::new();
        store.set_failing(true);
        assert!(store.ping().await.is_err());
        assert!(store.list_by_owner(Uuid::nil()).await.is_err());

        store.set_failing(false);
        assert!(store.list_by_owner(Uuid::nil()).await.unwrap().is_empty());
    }
}
