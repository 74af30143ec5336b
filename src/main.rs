use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

mod cli;
mod commands;
mod config;
mod delivery;
mod event;
mod slack;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_dir: &Path, log_level: LogLevel) -> Result<()> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("ecs-notify.log");

    // Stdout carries the invocation result, so logs go to a file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.to_level_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Forward {
            input,
            webhook_url,
            dry_run,
        } => commands::forward::run(&input, webhook_url, dry_run, &config),
        Commands::Format { input, pretty } => commands::format::run(&input, pretty, &config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let log_level = if cli.verbose { LogLevel::Debug } else { config.log_level };
    setup_logging(&config.log_dir(), log_level).context("Failed to setup logging")?;

    info!("Starting ecs-notify with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
