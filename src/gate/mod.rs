//! Navigation gate: the single place that decides whether a tab switch may
//! go ahead.
//!
//! Order of checks: update lock, then session, then click budget. An outdated
//! client is blocked no matter who is logged in, and logged-in users never
//! spend the anonymous budget.

pub mod tabs;

pub use tabs::{Tab, TabNavigator, TabSelection};

use crate::budget::ClickBudget;
use crate::events::{EventSender, GateEvent};
use crate::observability::{NoopObserver, Observer, ObserverEvent};
use crate::poller::UpdatePoller;
use crate::session::SessionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;

// ── Decision ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NavigationDecision {
    Allow,
    DenyUpdateRequired,
    DenyLoginRequired,
}

impl NavigationDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ── Gate ─────────────────────────────────────────────────────────────────────

pub struct NavigationGate {
    poller: Arc<UpdatePoller>,
    session: Arc<dyn SessionStore>,
    budget: ClickBudget,
    events: Option<EventSender>,
    observer: Arc<dyn Observer>,
}

impl NavigationGate {
    pub fn new(
        poller: Arc<UpdatePoller>,
        session: Arc<dyn SessionStore>,
        budget: ClickBudget,
    ) -> Self {
        Self {
            poller,
            session,
            budget,
            events: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Publish [`GateEvent::LoginRequired`] on this bus for every
    /// login-required denial.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn poller(&self) -> &Arc<UpdatePoller> {
        &self.poller
    }

    pub fn budget(&self) -> &ClickBudget {
        &self.budget
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Decide a switch to `target`. Callers filter re-selection of the
    /// active tab before asking (see [`TabNavigator`]).
    pub fn try_navigate(&self, target: Tab) -> NavigationDecision {
        let decision = if self.poller.is_locked() {
            NavigationDecision::DenyUpdateRequired
        } else if self.session.is_authenticated() || self.budget.consume_click() {
            NavigationDecision::Allow
        } else {
            NavigationDecision::DenyLoginRequired
        };

        tracing::debug!(target_tab = %target, %decision, "navigation decided");
        self.observer.record_event(&ObserverEvent::NavigationDecided {
            target: target.to_string(),
            decision: decision.to_string(),
        });

        if decision == NavigationDecision::DenyLoginRequired {
            self.observer.record_event(&ObserverEvent::BudgetExhausted {
                max: self.budget.max(),
            });
            if let Some(events) = &self.events {
                let _ = events.send(GateEvent::LoginRequired {
                    target: target.to_string(),
                });
            }
        }
        decision
    }
}
