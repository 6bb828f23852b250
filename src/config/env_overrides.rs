use super::GateConfig;

impl GateConfig {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) =
            std::env::var("GASOLINK_SUPABASE_URL").or_else(|_| std::env::var("SUPABASE_URL"))
            && !url.is_empty()
        {
            self.supabase.url = Some(url);
        }

        if let Ok(key) = std::env::var("GASOLINK_SUPABASE_ANON_KEY")
            .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
            && !key.is_empty()
        {
            self.supabase.anon_key = Some(key);
        }

        if let Ok(raw) = std::env::var("GASOLINK_MAX_CLICKS")
            && let Ok(max) = raw.parse::<u32>()
            && max > 0
        {
            self.click_budget.max_clicks = max;
        }

        if let Ok(raw) = std::env::var("GASOLINK_POLL_INTERVAL_SECS")
            && let Ok(secs) = raw.parse::<u64>()
            && secs > 0
        {
            self.version_gate.poll_interval_secs = secs;
        }

        if let Ok(version) = std::env::var("GASOLINK_INSTALLED_VERSION")
            && !version.is_empty()
        {
            self.version_gate.installed_version = version;
        }

        if let Ok(level) = std::env::var("GASOLINK_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }
    }
}
