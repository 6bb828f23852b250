use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level gate configuration, persisted as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Path the config was loaded from (not persisted)
    #[serde(skip)]
    pub config_path: PathBuf,
    #[serde(default)]
    pub version_gate: VersionGateConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub click_budget: ClickBudgetConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── Version gate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionGateConfig {
    /// Version the running build reports (default: this crate's version)
    #[serde(default = "default_installed_version")]
    pub installed_version: String,
    /// Seconds between periodic checks (default: 10)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Subscribe to realtime insert notifications (default: true)
    #[serde(default = "default_true")]
    pub realtime: bool,
}

fn default_installed_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for VersionGateConfig {
    fn default() -> Self {
        Self {
            installed_version: default_installed_version(),
            poll_interval_secs: default_poll_interval_secs(),
            realtime: true,
        }
    }
}

impl VersionGateConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

// ── Supabase backend ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: Option<String>,
    /// Public anon key sent as `apikey` and bearer token
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default = "default_versions_table")]
    pub table: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_versions_table() -> String {
    "app_versions".into()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            table: default_versions_table(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
            && self.anon_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// ── Click budget ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickBudgetConfig {
    /// Navigation actions an anonymous visitor gets (default: 7)
    #[serde(default = "default_max_clicks")]
    pub max_clicks: u32,
}

fn default_max_clicks() -> u32 {
    7
}

impl Default for ClickBudgetConfig {
    fn default() -> Self {
        Self {
            max_clicks: default_max_clicks(),
        }
    }
}

// ── Session store ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key/value file holding the `loggedIn` flag. `~` is expanded.
    #[serde(default = "default_session_store_path")]
    pub store_path: String,
}

fn default_session_store_path() -> String {
    "~/.gasolink/session.json".into()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_session_store_path(),
        }
    }
}

impl SessionConfig {
    pub fn resolved_store_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.store_path).into_owned())
    }
}

// ── Observability ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "none" | "log"
    #[serde(default = "default_observability_backend")]
    pub backend: String,
    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_observability_backend() -> String {
    "log".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_observability_backend(),
            log_level: default_log_level(),
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.click_budget.max_clicks == 0 {
            return Err(ConfigError::Validation(
                "click_budget.max_clicks must be greater than 0".into(),
            ));
        }
        if self.version_gate.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "version_gate.poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.version_gate.installed_version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "version_gate.installed_version must not be empty".into(),
            ));
        }
        if let Some(raw) = self.supabase.url.as_deref()
            && !raw.trim().is_empty()
        {
            let parsed = url::Url::parse(raw).map_err(|e| {
                ConfigError::Validation(format!("supabase.url '{raw}' is not a URL: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "supabase.url must be http(s), got '{}'",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }
}
