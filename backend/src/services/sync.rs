//! Sync coordinator for offline-first batch writes
//!
//! Saves go straight to the remote collection while online and fall back to
//! the offline queue otherwise. Coming back online drains the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, Utc};
use serde::Serialize;
use shared::{validate_batch_draft, BatchDraft, NewBatch};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch_store::BatchStore;
use crate::services::connectivity::{ConnectivityNotifier, SubscriptionId};
use crate::services::queue::{DrainReport, OfflineQueue};

/// Where a save landed
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Online,
    Offline,
}

/// Result of a save
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub success: bool,
    pub mode: SyncMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
}

/// Snapshot of the coordinator state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub online: bool,
    pub syncing: bool,
    pub pending_count: usize,
}

/// Resets the draining flag when a drain ends, even if it is cancelled
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncCoordinator {
    store: Arc<BatchStore>,
    queue: Arc<OfflineQueue>,
    notifier: Arc<dyn ConnectivityNotifier>,
    draining: AtomicBool,
    listener: Mutex<Option<(SubscriptionId, JoinHandle<()>)>>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<BatchStore>,
        queue: Arc<OfflineQueue>,
        notifier: Arc<dyn ConnectivityNotifier>,
    ) -> Self {
        Self {
            store,
            queue,
            notifier,
            draining: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    pub fn is_online(&self) -> bool {
        self.notifier.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    pub async fn pending_count(&self) -> AppResult<usize> {
        Ok(self.queue.pending_count().await?)
    }

    pub async fn status(&self) -> AppResult<SyncStatus> {
        Ok(SyncStatus {
            online: self.is_online(),
            syncing: self.is_syncing(),
            pending_count: self.pending_count().await?,
        })
    }

    /// Save a new batch.
    ///
    /// A draft that fails validation is the only error. A remote failure while
    /// online falls back to the queue; a queue failure is reported as
    /// `success: false`. The offline path never touches the remote.
    pub async fn save_batch(&self, draft: BatchDraft) -> AppResult<SaveOutcome> {
        validate_batch_draft(&draft, Local::now().date_naive())?;

        let record = NewBatch::from_draft(draft, self.store.owner(), Utc::now());

        if self.is_online() {
            match self.store.remote().insert(record.clone(), None).await {
                Ok(batch) => {
                    tracing::info!(batch_id = %batch.id, crop = %batch.crop_type, "Batch saved online");
                    self.store.refresh().await;
                    return Ok(SaveOutcome {
                        success: true,
                        mode: SyncMode::Online,
                        local_id: None,
                        batch_id: Some(batch.id),
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Online save failed, falling back to offline");
                }
            }
        }

        let outcome = match self.queue.enqueue(record).await {
            Ok(local_id) => {
                tracing::info!(%local_id, "Batch saved offline");
                SaveOutcome {
                    success: true,
                    mode: SyncMode::Offline,
                    local_id: Some(local_id),
                    batch_id: None,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Offline save failed");
                SaveOutcome {
                    success: false,
                    mode: SyncMode::Offline,
                    local_id: None,
                    batch_id: None,
                }
            }
        };
        self.store.refresh_local().await;
        Ok(outcome)
    }

    /// Commit every queued batch. Refused while another drain is running.
    pub async fn drain(&self) -> AppResult<DrainReport> {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::SyncInProgress);
        }
        let _guard = DrainGuard(&self.draining);

        let report = self.queue.drain(self.store.remote().as_ref()).await?;
        if report.committed > 0 {
            self.store.refresh().await;
        }
        Ok(report)
    }

    /// Manual retry, only while online
    pub async fn sync_now(&self) -> AppResult<DrainReport> {
        if !self.is_online() {
            return Err(AppError::Offline);
        }
        self.drain().await
    }

    /// Listen for connectivity changes and drain on every reconnection.
    /// Also drains immediately if already online with pending records.
    pub async fn start(self: &Arc<Self>) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }

        let (id, mut rx) = self.notifier.subscribe().await;
        let coordinator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if coordinator.is_online() {
                coordinator.on_reconnect().await;
            }
            while let Some(online) = rx.recv().await {
                if online {
                    coordinator.on_reconnect().await;
                } else {
                    tracing::info!("Offline, new batches will be queued");
                }
            }
            tracing::debug!("Connectivity listener stopped");
        });

        *listener = Some((id, handle));
        tracing::info!("Sync coordinator started");
    }

    /// Deregister the connectivity listener and wait for it to finish
    pub async fn shutdown(&self) {
        let Some((id, handle)) = self.listener.lock().await.take() else {
            return;
        };

        self.notifier.unsubscribe(id).await;
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Connectivity listener ended abnormally");
        }
        tracing::info!("Sync coordinator stopped");
    }

    async fn on_reconnect(&self) {
        match self.drain().await {
            Ok(report) if report.committed + report.failed > 0 => {
                tracing::info!(
                    committed = report.committed,
                    failed = report.failed,
                    "Reconnected, offline batches synced"
                );
            }
            Ok(_) => {}
            Err(AppError::SyncInProgress) => {
                tracing::debug!("Drain already running, skipping");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sync failed");
            }
        }
    }
}
