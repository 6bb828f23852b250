use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::GateConfig;

/// Live-reloadable configuration holder.
///
/// Readers never block; [`ConfigHandle::reload`] atomically swaps in a fresh
/// snapshot from disk. Components that were already built from an older
/// snapshot keep their values (a running click budget is not resized).
pub struct ConfigHandle {
    inner: Arc<ArcSwap<GateConfig>>,
    path: PathBuf,
}

impl ConfigHandle {
    pub fn new(config: GateConfig) -> Self {
        let path = config.config_path.clone();
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path,
        }
    }

    /// Current snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<GateConfig>> {
        self.inner.load()
    }

    pub fn load_full(&self) -> Arc<GateConfig> {
        self.inner.load_full()
    }

    /// Re-read the config file, propagating parse/validation errors.
    pub fn reload(&self) -> anyhow::Result<()> {
        let fresh = GateConfig::load_from_path(&self.path)?;
        self.inner.store(Arc::new(fresh));
        tracing::info!(path = %self.path.display(), "config hot-reloaded");
        Ok(())
    }

    pub fn store(&self, config: GateConfig) {
        self.inner.store(Arc::new(config));
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_env::EnvScope;

    #[test]
    fn clone_shares_swapped_state() {
        let handle = ConfigHandle::new(GateConfig::default());
        let clone = handle.clone();

        let mut updated = GateConfig::default();
        updated.click_budget.max_clicks = 2;
        handle.store(updated);

        assert_eq!(clone.load().click_budget.max_clicks, 2);
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let mut env = EnvScope::lock();
        env.unset("GASOLINK_MAX_CLICKS")
            .unset("GASOLINK_POLL_INTERVAL_SECS")
            .unset("GASOLINK_INSTALLED_VERSION");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[version_gate]\npoll_interval_secs = 10\n").unwrap();

        let handle = ConfigHandle::new(GateConfig::load_from_path(&path).unwrap());
        std::fs::write(&path, "[version_gate]\npoll_interval_secs = 45\n").unwrap();
        handle.reload().unwrap();

        assert_eq!(handle.load().version_gate.poll_interval_secs, 45);
        assert_eq!(handle.path(), path.as_path());
    }

    #[test]
    fn reload_fails_on_missing_file() {
        let config = GateConfig {
            config_path: PathBuf::from("/nonexistent/path/config.toml"),
            ..GateConfig::default()
        };
        let handle = ConfigHandle::new(config);
        assert!(handle.reload().is_err());
    }
}
