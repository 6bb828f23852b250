use super::GateConfig;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl GateConfig {
    /// Load `~/.gasolink/config.toml`, writing defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let gasolink_dir = home.join(".gasolink");
        let config_path = gasolink_dir.join("config.toml");

        if !gasolink_dir.exists() {
            fs::create_dir_all(&gasolink_dir).context("Failed to create .gasolink directory")?;
        }

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Parse and validate the config at `path`, applying env overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: GateConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = path.to_path_buf();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
