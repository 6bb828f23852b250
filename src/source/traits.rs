use crate::error::SourceError;
use crate::version::VersionRecord;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Notification that a new row landed in the versions table.
///
/// The payload is informational only: receivers re-fetch the newest record
/// instead of trusting the pushed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertNotice {
    pub version: Option<String>,
}

pub type InsertSender = broadcast::Sender<InsertNotice>;
pub type InsertReceiver = broadcast::Receiver<InsertNotice>;

/// Create a broadcast bus for insert notifications.
pub fn insert_bus(capacity: usize) -> (InsertSender, InsertReceiver) {
    broadcast::channel(capacity)
}

/// A live insert subscription.
///
/// Owns whatever keeps the push channel open (e.g. a realtime socket task);
/// dropping the subscription tears that down.
pub struct InsertSubscription {
    rx: InsertReceiver,
    _keepalive: Option<Box<dyn Any + Send + Sync>>,
}

impl InsertSubscription {
    pub fn new(rx: InsertReceiver) -> Self {
        Self {
            rx,
            _keepalive: None,
        }
    }

    /// Keep `keepalive` alive exactly as long as this subscription.
    pub fn with_keepalive(rx: InsertReceiver, keepalive: impl Any + Send + Sync) -> Self {
        Self {
            rx,
            _keepalive: Some(Box::new(keepalive)),
        }
    }

    pub async fn recv(&mut self) -> Result<InsertNotice, RecvError> {
        self.rx.recv().await
    }
}

/// Backend that publishes the latest app version.
///
/// Implementations wrap a remote table (Supabase PostgREST + Realtime) or an
/// in-memory fake. The poller calls `fetch_latest()` on every trigger and
/// listens on `subscribe()` for push notifications.
pub trait VersionSource: Send + Sync {
    /// Human-readable source name (e.g. "supabase", "memory")
    fn name(&self) -> &str;

    /// Newest published record, `Ok(None)` when the table is empty.
    fn fetch_latest(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VersionRecord>, SourceError>> + Send + '_>>;

    /// Subscribe to insert notifications. `None` when the source has no push
    /// channel; the poller then relies on its timer alone. Sources that need
    /// a connection open it here and close it when the subscription drops.
    fn subscribe(&self) -> Option<InsertSubscription>;
}
