use std::time::Duration;

/// Events the observer can record
#[derive(Debug, Clone)]
pub enum ObserverEvent {
    VersionCheck {
        source: String,
        outcome: String,
        duration: Duration,
    },
    UpdateLocked {
        installed: String,
        available: String,
    },
    NavigationDecided {
        target: String,
        decision: String,
    },
    BudgetExhausted {
        max: u32,
    },
    Error {
        component: String,
        message: String,
    },
}

/// Sink for gate telemetry.
pub trait Observer: Send + Sync {
    fn record_event(&self, event: &ObserverEvent);

    /// Called when the gate unmounts.
    fn flush(&self) {}

    fn name(&self) -> &str;
}
