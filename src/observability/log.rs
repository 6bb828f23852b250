use super::traits::{Observer, ObserverEvent};
use tracing::{info, warn};

/// Writes each event as a structured `tracing` record.
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogObserver {
    fn record_event(&self, event: &ObserverEvent) {
        match event {
            ObserverEvent::VersionCheck {
                source,
                outcome,
                duration,
            } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                info!(source = %source, outcome = %outcome, duration_ms = ms, "version.check");
            }
            ObserverEvent::UpdateLocked {
                installed,
                available,
            } => {
                warn!(installed = %installed, available = %available, "version.locked");
            }
            ObserverEvent::NavigationDecided { target, decision } => {
                info!(target_tab = %target, decision = %decision, "navigation.decided");
            }
            ObserverEvent::BudgetExhausted { max } => {
                info!(max = max, "click_budget.exhausted");
            }
            ObserverEvent::Error { component, message } => {
                warn!(component = %component, error = %message, "error");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
