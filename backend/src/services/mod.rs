//! Business logic services for the Post-Harvest Risk Platform

pub mod advisory;
pub mod batch_store;
pub mod connectivity;
pub mod notification;
pub mod queue;
pub mod risk_monitor;
pub mod sync;
pub mod weather;

pub use advisory::AdvisoryService;
pub use batch_store::{BatchStore, RemoteBatchStore};
pub use connectivity::{ConnectivityNotifier, NetworkMonitor, SubscriptionId};
pub use notification::NotificationService;
pub use queue::{DrainReport, OfflineQueue, QueuedWrite};
pub use risk_monitor::{RiskAlert, RiskMonitor};
pub use sync::{SaveOutcome, SyncCoordinator, SyncMode, SyncStatus};
pub use weather::ForecastFeed;
