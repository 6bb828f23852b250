//! Remote version gate.
//!
//! The poller asks its [`VersionSource`] for the newest published record on
//! mount, on a fixed interval and on every insert notification. When a record
//! is newer than the installed build the client locks, and stays locked until
//! the process restarts. Fetch failures leave the state untouched: absence of
//! a confirmed newer version never locks anyone out.

pub mod state;
pub mod worker;

pub use state::{CheckOutcome, LocalVersionState, PollerState};
pub use worker::{PollerHandle, spawn};

use crate::error::OpenerError;
use crate::events::{EventSender, GateEvent};
use crate::observability::{NoopObserver, Observer, ObserverEvent};
use crate::platform::UrlOpener;
use crate::source::VersionSource;
use crate::version::{VersionRecord, is_newer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct UpdatePoller {
    source: Arc<dyn VersionSource>,
    state: Mutex<LocalVersionState>,
    in_flight: AtomicBool,
    events: Option<EventSender>,
    observer: Arc<dyn Observer>,
}

/// Clears the in-flight flag even if the check future is dropped mid-fetch.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl UpdatePoller {
    pub fn new(source: Arc<dyn VersionSource>, installed_version: impl Into<String>) -> Self {
        Self {
            source,
            state: Mutex::new(LocalVersionState::new(installed_version)),
            in_flight: AtomicBool::new(false),
            events: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Publish [`GateEvent::UpdateRequired`] on this bus when the lock engages.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub(crate) fn source(&self) -> &Arc<dyn VersionSource> {
        &self.source
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LocalVersionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn installed_version(&self) -> String {
        self.lock_state().installed_version.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state().lock
    }

    pub fn state(&self) -> PollerState {
        if self.is_locked() {
            PollerState::Locked
        } else if self.in_flight.load(Ordering::SeqCst) {
            PollerState::Checking
        } else {
            PollerState::Idle
        }
    }

    pub fn snapshot(&self) -> LocalVersionState {
        self.lock_state().clone()
    }

    pub fn pending_record(&self) -> Option<VersionRecord> {
        self.lock_state().pending_record.clone()
    }

    pub fn pending_artifact_url(&self) -> Option<String> {
        self.lock_state()
            .pending_record
            .as_ref()
            .map(|r| r.artifact_url.clone())
    }

    /// Run one check. Every trigger (mount, timer, insert notice) goes
    /// through here; overlapping calls collapse into the one in flight.
    pub async fn check_now(&self) -> CheckOutcome {
        if self.is_locked() {
            return CheckOutcome::AlreadyLocked;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("version check already in flight; skipping");
            return CheckOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let started = Instant::now();
        let outcome = match self.source.fetch_latest().await {
            Ok(None) => CheckOutcome::NoRecord,
            Ok(Some(record)) => self.evaluate(record),
            Err(e) => {
                tracing::warn!(source = self.source.name(), "version check failed: {e}");
                self.observer.record_event(&ObserverEvent::Error {
                    component: "version_poller".into(),
                    message: e.to_string(),
                });
                CheckOutcome::Failed
            }
        };

        self.observer.record_event(&ObserverEvent::VersionCheck {
            source: self.source.name().to_string(),
            outcome: outcome.to_string(),
            duration: started.elapsed(),
        });
        outcome
    }

    fn evaluate(&self, record: VersionRecord) -> CheckOutcome {
        let mut state = self.lock_state();
        if !is_newer(&record.version, &state.installed_version) {
            tracing::debug!(
                installed = %state.installed_version,
                latest = %record.version,
                "client is up to date"
            );
            return CheckOutcome::UpToDate;
        }

        let installed = state.installed_version.clone();
        let version = record.version.clone();
        let artifact_url = record.artifact_url.clone();
        let newly_locked = state.lock_on(record);
        drop(state);

        if newly_locked {
            tracing::info!(installed = %installed, available = %version, "update required; client locked");
            self.observer.record_event(&ObserverEvent::UpdateLocked {
                installed,
                available: version.clone(),
            });
            if let Some(events) = &self.events {
                // The UI may not be listening yet; the lock itself is what counts.
                let _ = events.send(GateEvent::UpdateRequired {
                    version,
                    artifact_url,
                });
            }
        }
        CheckOutcome::Locked
    }

    /// Hand the pending artifact link to `opener`. `Ok(false)` when nothing
    /// is pending.
    pub async fn open_artifact(&self, opener: &dyn UrlOpener) -> Result<bool, OpenerError> {
        let Some(url) = self.pending_artifact_url() else {
            return Ok(false);
        };
        opener.open(&url).await?;
        Ok(true)
    }
}
