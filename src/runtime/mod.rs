//! `VersionGate`: one object wiring source, poller, session, budget and gate
//! together from a [`GateConfig`].

use crate::budget::ClickBudget;
use crate::config::GateConfig;
use crate::error::GateError;
use crate::events::{EventReceiver, EventSender, event_bus};
use crate::gate::{NavigationDecision, NavigationGate, Tab, TabNavigator};
use crate::observability::{Observer, create_observer};
use crate::platform::{UrlOpener, install_crypto_provider};
use crate::poller::{self, CheckOutcome, PollerHandle, UpdatePoller};
use crate::session::{FileSessionStore, SessionStore};
use crate::source::{MemoryVersionSource, SupabaseVersionSource, VersionSource};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const EVENT_BUS_CAPACITY: usize = 32;

pub struct VersionGate {
    gate: Arc<NavigationGate>,
    events: EventSender,
    observer: Arc<dyn Observer>,
    poll_interval: Duration,
    worker: Mutex<Option<PollerHandle>>,
}

impl VersionGate {
    /// Build the production wiring: Supabase source (with realtime when
    /// enabled) and the file-backed session store.
    ///
    /// The realtime socket only opens on [`start`](Self::start) and closes
    /// on [`stop`](Self::stop). An unconfigured backend yields a source with
    /// no records, so the client is never locked.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        install_crypto_provider();

        let source: Arc<dyn VersionSource> = if config.supabase.is_configured() {
            Arc::new(SupabaseVersionSource::from_config(
                &config.supabase,
                config.version_gate.realtime,
            )?)
        } else {
            tracing::warn!("supabase is not configured; update checks will find nothing");
            Arc::new(MemoryVersionSource::new())
        };
        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(
            config.session.resolved_store_path(),
        ));

        Self::with_parts(config, source, session, || {
            tracing::info!("free navigation used up; login required");
        })
    }

    /// Build around injected collaborators. `on_exhausted` runs on every
    /// login-required denial.
    pub fn with_parts(
        config: &GateConfig,
        source: Arc<dyn VersionSource>,
        session: Arc<dyn SessionStore>,
        on_exhausted: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, GateError> {
        config.validate()?;

        let (events, _rx) = event_bus(EVENT_BUS_CAPACITY);
        let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));

        let poller = UpdatePoller::new(source, config.version_gate.installed_version.clone())
            .with_events(events.clone())
            .with_observer(Arc::clone(&observer));
        let budget = ClickBudget::from_config(&config.click_budget, on_exhausted)?;
        let gate = NavigationGate::new(Arc::new(poller), session, budget)
            .with_events(events.clone())
            .with_observer(Arc::clone(&observer));

        Ok(Self {
            gate: Arc::new(gate),
            events,
            observer,
            poll_interval: config.version_gate.poll_interval(),
            worker: Mutex::new(None),
        })
    }

    /// Mount the poller. Returns `false` if it is already running.
    pub fn start(&self) -> bool {
        let mut worker = self
            .worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if worker.as_ref().is_some_and(PollerHandle::is_running) {
            return false;
        }
        *worker = Some(poller::spawn(
            Arc::clone(self.gate.poller()),
            self.poll_interval,
        ));
        true
    }

    /// Unmount the poller: cancel the timer and any in-flight check, and drop
    /// the insert subscription (closing the realtime socket). The lock, if
    /// engaged, stays.
    pub async fn stop(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
        self.observer.flush();
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .is_some_and(PollerHandle::is_running)
    }

    pub fn subscribe_events(&self) -> EventReceiver {
        self.events.subscribe()
    }

    pub fn gate(&self) -> &Arc<NavigationGate> {
        &self.gate
    }

    pub fn poller(&self) -> &Arc<UpdatePoller> {
        self.gate.poller()
    }

    pub fn is_locked(&self) -> bool {
        self.gate.poller().is_locked()
    }

    /// Record a login or logout in the session store. Navigation picks the
    /// change up on the next call.
    pub fn set_logged_in(&self, logged_in: bool) -> Result<(), GateError> {
        self.gate.session().set_logged_in(logged_in)?;
        Ok(())
    }

    pub fn try_navigate(&self, target: Tab) -> NavigationDecision {
        self.gate.try_navigate(target)
    }

    pub fn navigator(&self, initial: Tab) -> TabNavigator {
        TabNavigator::new(Arc::clone(&self.gate), initial)
    }

    /// Run a check outside the timer, e.g. when the app returns to the
    /// foreground.
    pub async fn check_now(&self) -> CheckOutcome {
        self.gate.poller().check_now().await
    }

    /// Open the download link of the version that locked the client.
    pub async fn open_artifact(&self, opener: &dyn UrlOpener) -> Result<bool, GateError> {
        Ok(self.gate.poller().open_artifact(opener).await?)
    }
}
