#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod budget;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod observability;
pub mod platform;
pub mod poller;
pub mod runtime;
pub mod session;
pub mod source;
pub mod version;

pub use budget::{ClickBudget, ClickBudgetState};
pub use config::{ConfigHandle, GateConfig};
pub use error::{GateError, Result};
pub use events::{EventReceiver, GateEvent};
pub use gate::{NavigationDecision, NavigationGate, Tab, TabNavigator, TabSelection};
pub use poller::{CheckOutcome, PollerHandle, PollerState, UpdatePoller};
pub use runtime::VersionGate;
pub use session::SessionStore;
pub use source::VersionSource;
pub use version::{VersionRecord, compare};
