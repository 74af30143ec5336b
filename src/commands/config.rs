use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;
use crate::delivery::redact_url;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

/// Config as displayed: the webhook secret never leaves the process
#[derive(Serialize)]
struct DisplayConfig {
    webhook_url: Option<String>,
    log_level: &'static str,
    log_dir: String,
    service_actions: bool,
    timeout_secs: Option<u64>,
}

impl From<&Config> for DisplayConfig {
    fn from(config: &Config) -> Self {
        Self {
            webhook_url: config.webhook_url.as_deref().map(redact_url),
            log_level: config.log_level.as_filter(),
            log_dir: config.log_dir().display().to_string(),
            service_actions: config.service_actions,
            timeout_secs: config.timeout_secs,
        }
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    let display = DisplayConfig::from(config);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&display)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&display)?);
        }
        OutputFormat::Text => {
            println!("{}", "ecs-notify configuration".bold());
            println!();
            println!(
                "  {}: {}",
                "webhook_url".cyan(),
                display.webhook_url.as_deref().unwrap_or("(not set)")
            );
            println!("  {}: {}", "log_level".cyan(), display.log_level);
            println!("  {}: {}", "log_dir".cyan(), display.log_dir);
            println!("  {}: {}", "service_actions".cyan(), display.service_actions);
            println!(
                "  {}: {}",
                "timeout_secs".cyan(),
                display
                    .timeout_secs
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }
    }

    Ok(())
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }
    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    let display = DisplayConfig::from(config);
    match key {
        "webhook_url" | "webhook-url" => Some(display.webhook_url.unwrap_or_default()),
        "log_level" | "log-level" => Some(display.log_level.to_string()),
        "log_dir" | "log-dir" => Some(display.log_dir),
        "service_actions" | "service-actions" => Some(display.service_actions.to_string()),
        "timeout_secs" | "timeout-secs" => Some(display.timeout_secs.map(|t| t.to_string()).unwrap_or_default()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn config() -> Config {
        Config {
            webhook_url: Some("https://hooks.slack.com/services/T000/B000/SECRET".to_string()),
            log_level: LogLevel::Warn,
            service_actions: true,
            timeout_secs: Some(3),
            ..Config::default()
        }
    }

    #[test]
    fn test_display_config_redacts_webhook() {
        let display = DisplayConfig::from(&config());
        assert_eq!(display.webhook_url.as_deref(), Some("https://hooks.slack.com/***"));
        let json = serde_json::to_string(&display).unwrap();
        assert!(!json.contains("SECRET"));
    }

    #[test]
    fn test_lookup_known_keys() {
        let config = config();
        assert_eq!(lookup("log_level", &config).as_deref(), Some("warn"));
        assert_eq!(lookup("service-actions", &config).as_deref(), Some("true"));
        assert_eq!(lookup("timeout_secs", &config).as_deref(), Some("3"));
        assert_eq!(lookup("webhook_url", &config).as_deref(), Some("https://hooks.slack.com/***"));
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(lookup("paths.plugins", &config()).is_none());
        assert!(get("nope", &config()).is_err());
    }
}
