use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::slack::FormatOptions;

/// Env var that overrides `webhook_url`
pub const WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";

/// Env var pointing at an explicit config file
pub const CONFIG_ENV: &str = "ECS_NOTIFY_CONFIG";

const CONFIG_FILE: &str = "ecs-notify.yaml";

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Main ecs-notify configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Slack incoming-webhook URL. Required to send, no default.
    pub webhook_url: Option<String>,
    pub log_level: LogLevel,
    /// Directory for `ecs-notify.log` (supports `~` and env vars)
    pub log_dir: Option<PathBuf>,
    /// Render `ECS Service Action` events instead of dropping their content
    pub service_actions: bool,
    /// Whole-request timeout for the webhook POST
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with fallback chain, then apply env overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config = Self::load_file(config_path)?;
        Ok(config.with_webhook_override(std::env::var(WEBHOOK_URL_ENV).ok()))
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", CONFIG_ENV, e);
                    }
                }
            }
        }

        // Try ~/.config/ecs-notify/ecs-notify.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("ecs-notify").join(CONFIG_FILE);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./ecs-notify.yaml (for development)
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Replace `webhook_url` with `url` when it is set and non-empty
    pub fn with_webhook_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.webhook_url = Some(url);
        }
        self
    }

    /// The webhook URL, or an error if none was configured
    pub fn webhook_url(&self) -> Result<&str> {
        self.webhook_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                eyre::eyre!(
                    "No webhook URL configured (set {}, webhook_url in {}, or pass --webhook-url)",
                    WEBHOOK_URL_ENV,
                    CONFIG_FILE
                )
            })
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            service_actions: self.service_actions,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Directory log files are written to
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => Self::expand_path(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ecs-notify")
                .join("logs"),
        }
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
