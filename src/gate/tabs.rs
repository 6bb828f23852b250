use super::{NavigationDecision, NavigationGate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

/// Bottom tab bar destinations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Tab {
    #[default]
    Inicio,
    VeiculoConfig,
    Financeiro,
    PerfilUser,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Inicio,
        Tab::VeiculoConfig,
        Tab::Financeiro,
        Tab::PerfilUser,
    ];
}

/// What happened to a tab press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabSelection {
    /// The pressed tab was already active; the gate was not consulted.
    Unchanged,
    Switched(Tab),
    Denied(NavigationDecision),
}

/// Caller-side tab state: filters re-selection of the active tab so repeated
/// taps never spend the click budget, then asks the gate.
pub struct TabNavigator {
    gate: Arc<NavigationGate>,
    current: Tab,
}

impl TabNavigator {
    pub fn new(gate: Arc<NavigationGate>, initial: Tab) -> Self {
        Self {
            gate,
            current: initial,
        }
    }

    pub fn current(&self) -> Tab {
        self.current
    }

    pub fn select(&mut self, tab: Tab) -> TabSelection {
        if tab == self.current {
            return TabSelection::Unchanged;
        }
        match self.gate.try_navigate(tab) {
            NavigationDecision::Allow => {
                self.current = tab;
                TabSelection::Switched(tab)
            }
            denied => TabSelection::Denied(denied),
        }
    }
}
