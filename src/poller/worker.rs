use super::UpdatePoller;
use crate::source::{InsertNotice, InsertSubscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Owns the running trigger loop of a mounted poller.
///
/// [`stop`](Self::stop) (or dropping the handle) cancels the timer and any
/// in-flight check, and drops the insert subscription.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal shutdown and wait for the loop to exit. An in-flight check is
    /// abandoned.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && e.is_panic()
        {
            tracing::error!("version poller task panicked: {e}");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Mount the poller: check once now, then on every `interval` tick while
/// unlocked and on every insert notice from the source.
pub fn spawn(poller: Arc<UpdatePoller>, interval: Duration) -> PollerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let notices = poller.source().subscribe();
    let handle = tokio::spawn(run_poller_loop(poller, interval, notices, shutdown_rx));
    PollerHandle {
        shutdown: shutdown_tx,
        handle: Some(handle),
    }
}

#[derive(Debug)]
enum Trigger {
    Notice(Option<InsertNotice>),
    FeedClosed,
}

async fn next_notice(notices: &mut Option<InsertSubscription>) -> Trigger {
    let Some(subscription) = notices.as_mut() else {
        return std::future::pending().await;
    };
    match subscription.recv().await {
        Ok(notice) => Trigger::Notice(Some(notice)),
        // Missed notices still mean something was inserted.
        Err(RecvError::Lagged(_)) => Trigger::Notice(None),
        Err(RecvError::Closed) => Trigger::FeedClosed,
    }
}

/// Resolves once stop was requested or the handle is gone.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Run one check, abandoning it if shutdown arrives first. `false` means the
/// loop should exit.
async fn check_or_shutdown(poller: &UpdatePoller, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = poller.check_now() => true,
        () = shutdown_signalled(shutdown) => false,
    }
}

async fn run_poller_loop(
    poller: Arc<UpdatePoller>,
    interval: Duration,
    mut notices: Option<InsertSubscription>,
    mut shutdown: watch::Receiver<bool>,
) {
    let interval = interval.max(Duration::from_millis(1));
    tracing::info!(
        installed = %poller.installed_version(),
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        realtime = notices.is_some(),
        "version poller mounted"
    );

    if !check_or_shutdown(&poller, &mut shutdown).await {
        tracing::info!("version poller unmounted");
        return;
    }

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let locked = poller.is_locked();
        let run_check = tokio::select! {
            _ = ticker.tick(), if !locked => true,
            trigger = next_notice(&mut notices) => match trigger {
                Trigger::Notice(notice) => {
                    tracing::debug!(
                        version = ?notice.and_then(|n| n.version),
                        "insert notice; checking now"
                    );
                    true
                }
                Trigger::FeedClosed => {
                    tracing::warn!("insert feed closed; relying on periodic checks");
                    notices = None;
                    false
                }
            },
            () = shutdown_signalled(&mut shutdown) => break,
        };
        if run_check && !check_or_shutdown(&poller, &mut shutdown).await {
            break;
        }
    }

    tracing::info!("version poller unmounted");
}
