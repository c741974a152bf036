//! Connectivity notifications
//!
//! The platform reports online/offline changes to a [`ConnectivityNotifier`].
//! Listeners hold a subscription id and must unsubscribe on teardown.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[async_trait]
pub trait ConnectivityNotifier: Send + Sync {
    fn is_online(&self) -> bool;

    /// Register a listener. The receiver yields every state change and
    /// closes once the subscription is removed.
    async fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<bool>);

    async fn unsubscribe(&self, id: SubscriptionId);
}

/// Connectivity state fed by the platform network signal
pub struct NetworkMonitor {
    online: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<HashMap<SubscriptionId, mpsc::UnboundedSender<bool>>>,
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Record the current state, notifying listeners when it changed.
    /// Returns whether the state changed.
    pub async fn set_online(&self, online: bool) -> bool {
        if self.online.swap(online, Ordering::SeqCst) == online {
            return false;
        }

        tracing::info!(online, "Connectivity changed");
        let mut listeners = self.listeners.lock().await;
        listeners.retain(|_, tx| tx.send(online).is_ok());
        true
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.lock().await.len()
    }
}

#[async_trait]
impl ConnectivityNotifier for NetworkMonitor {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<bool>) {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().await.insert(id, tx);
        (id, rx)
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().await.remove(&id);
    }
}
