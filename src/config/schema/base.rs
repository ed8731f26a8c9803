use super::service::ServiceConfig;
use super::workflow::{
    ActivityConfig, DashboardConfig, ExpertConfig, GenerationConfig, SafetyConfig,
};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const CONFIG_FILENAME: &str = "config.toml";
const SESSION_FILENAME: &str = "session.json";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (~/.geminizer) - computed, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Log level: error, warn, info, debug, trace (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub activity: ActivityConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub expert: ExpertConfig,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_data_dir() -> PathBuf {
    let home = UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
    home.join(".geminizer")
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            config_path: data_dir.join(CONFIG_FILENAME),
            data_dir,
            log_level: default_log_level(),
            service: ServiceConfig::default(),
            safety: SafetyConfig::default(),
            generation: GenerationConfig::default(),
            activity: ActivityConfig::default(),
            dashboard: DashboardConfig::default(),
            expert: ExpertConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_at(&home.join(".geminizer"))
    }

    /// Load `config.toml` from `data_dir`, writing defaults when it is missing.
    pub fn load_or_init_at(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILENAME);

        if !data_dir.exists() {
            fs::create_dir_all(data_dir).context("Failed to create .geminizer directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config.data_dir = data_dir.to_path_buf();
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILENAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.generation
            .export_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));

        let Ok(url) = Url::parse(self.service.base_url.trim()) else {
            return invalid(format!("invalid service.base_url: {}", self.service.base_url));
        };
        if !matches!(url.scheme(), "http" | "https") {
            return invalid(format!(
                "service.base_url must be http or https, got {}",
                url.scheme()
            ));
        }
        if self.service.request_timeout_secs == 0 {
            return invalid("service.request_timeout_secs must be greater than zero".into());
        }
        if self.service.connect_timeout_secs == 0 {
            return invalid("service.connect_timeout_secs must be greater than zero".into());
        }
        if self.dashboard.poll_interval_secs == 0 {
            return invalid("dashboard.poll_interval_secs must be greater than zero".into());
        }

        let mut seen = HashSet::new();
        for stage in &self.activity.stages {
            if stage.id.trim().is_empty() {
                return invalid("activity stage ids must not be empty".into());
            }
            if !seen.insert(stage.id.as_str()) {
                return invalid(format!("duplicate activity stage id: {}", stage.id));
            }
        }

        for (key, value) in &self.generation.default_options {
            if key.trim().is_empty() || value.trim().is_empty() {
                return invalid("generation.default_options entries must not be empty".into());
            }
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GEMINIZER_API_URL") {
            if !url.trim().is_empty() {
                self.service.base_url = url.trim().to_string();
            }
        }

        if let Some(secs) = lookup("GEMINIZER_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse::<u64>() {
                if secs > 0 {
                    self.service.request_timeout_secs = secs;
                }
            }
        }

        if let Some(level) = lookup("GEMINIZER_LOG") {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_lowercase();
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
