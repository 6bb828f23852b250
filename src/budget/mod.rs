//! Soft paywall: a count of free navigation actions for anonymous visitors.
//!
//! The counter lives in memory only and starts over whenever the client is
//! relaunched. That makes it a nudge toward logging in, not an enforcement
//! mechanism.

use crate::config::ClickBudgetConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub const DEFAULT_MAX_CLICKS: u32 = 7;

type ExhaustedCallback = Box<dyn Fn() + Send + Sync>;

/// Point-in-time view of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickBudgetState {
    pub used: u32,
    pub max: u32,
    pub exhausted: bool,
}

#[derive(Debug, Default)]
struct Counter {
    used: u32,
    exhausted: bool,
}

/// Counts throttled actions; the `max`-th attempt is denied.
///
/// With `max = 7`, six calls to [`consume_click`](Self::consume_click)
/// succeed and the seventh returns `false` and fires the callback. `used`
/// therefore never goes past `max - 1`.
pub struct ClickBudget {
    max: u32,
    counter: Mutex<Counter>,
    on_exhausted: ExhaustedCallback,
}

impl ClickBudget {
    pub fn new(
        max: u32,
        on_exhausted: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        if max == 0 {
            return Err(ConfigError::Validation(
                "click budget max must be greater than 0".into(),
            ));
        }
        Ok(Self {
            max,
            counter: Mutex::new(Counter::default()),
            on_exhausted: Box::new(on_exhausted),
        })
    }

    pub fn from_config(
        config: &ClickBudgetConfig,
        on_exhausted: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        Self::new(config.max_clicks, on_exhausted)
    }

    /// Spend one action. Returns `false` (and fires the callback) once the
    /// budget is spent; a denied call does not count.
    pub fn consume_click(&self) -> bool {
        let allowed = {
            let mut counter = self
                .counter
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if counter.used.saturating_add(1) >= self.max {
                counter.exhausted = true;
                false
            } else {
                counter.used += 1;
                true
            }
        };

        if !allowed {
            tracing::debug!(max = self.max, "click budget exhausted");
            (self.on_exhausted)();
        }
        allowed
    }

    /// `max - used` while clicks remain; `0` once a click has been denied.
    pub fn remaining(&self) -> u32 {
        let counter = self
            .counter
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if counter.exhausted {
            0
        } else {
            self.max - counter.used
        }
    }

    pub fn used(&self) -> u32 {
        self.counter
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .used
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.counter
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .exhausted
    }

    pub fn snapshot(&self) -> ClickBudgetState {
        let counter = self
            .counter
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        ClickBudgetState {
            used: counter.used,
            max: self.max,
            exhausted: counter.exhausted,
        }
    }
}

impl std::fmt::Debug for ClickBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickBudget")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}
