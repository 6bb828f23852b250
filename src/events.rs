use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events the gate publishes for the rendering layer.
///
/// The UI subscribes to decide when to show its blocking update modal or its
/// login prompt; the gate itself never renders anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateEvent {
    /// A newer published version locked the client. Sent once per lock.
    UpdateRequired {
        version: String,
        artifact_url: String,
    },
    /// An anonymous visitor ran out of free navigation.
    LoginRequired { target: String },
}

pub type EventSender = broadcast::Sender<GateEvent>;
pub type EventReceiver = broadcast::Receiver<GateEvent>;

/// Create a broadcast event bus with the given capacity.
pub fn event_bus(capacity: usize) -> (EventSender, EventReceiver) {
    broadcast::channel(capacity)
}
