use super::traits::{InsertNotice, InsertSender, InsertSubscription, VersionSource, insert_bus};
use crate::error::SourceError;
use crate::version::VersionRecord;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// In-process version source.
///
/// Holds the latest record in memory and emits an [`InsertNotice`] on every
/// [`publish`](Self::publish). Useful for offline builds and for driving the
/// poller in tests.
#[derive(Debug)]
pub struct MemoryVersionSource {
    latest: Mutex<Option<VersionRecord>>,
    pending_failures: AtomicU32,
    fetches: AtomicUsize,
    fetch_delay: Option<Duration>,
    notices: InsertSender,
}

impl MemoryVersionSource {
    pub fn new() -> Self {
        let (notices, _rx) = insert_bus(16);
        Self {
            latest: Mutex::new(None),
            pending_failures: AtomicU32::new(0),
            fetches: AtomicUsize::new(0),
            fetch_delay: None,
            notices,
        }
    }

    pub fn with_latest(record: VersionRecord) -> Self {
        let source = Self::new();
        source.set_latest(Some(record));
        source
    }

    /// Delay every fetch, simulating a slow round-trip.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Replace the stored record without notifying subscribers.
    pub fn set_latest(&self, record: Option<VersionRecord>) {
        *self
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = record;
    }

    /// Store `record` as the newest row and notify subscribers.
    pub fn publish(&self, record: VersionRecord) {
        let notice = InsertNotice {
            version: Some(record.version.clone()),
        };
        self.set_latest(Some(record));
        // No subscribers is fine: the poller may not be mounted yet.
        let _ = self.notices.send(notice);
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of fetches served so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for MemoryVersionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionSource for MemoryVersionSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_latest(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VersionRecord>, SourceError>> + Send + '_>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.fetch_delay {
                tokio::time::sleep(delay).await;
            }

            let failing = self
                .pending_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(SourceError::Unavailable("simulated outage".into()));
            }

            Ok(self
                .latest
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone())
        })
    }

    fn subscribe(&self) -> Option<InsertSubscription> {
        Some(InsertSubscription::new(self.notices.subscribe()))
    }
}
