use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "ecs-notify",
    about = "Forward ECS events from SNS to a Slack incoming webhook",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/ecs-notify/logs/ecs-notify.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to ecs-notify.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the trigger payload comes from and how it is wrapped
#[derive(Debug, Clone, clap::Args)]
pub struct InputArgs {
    /// Read the payload from a file instead of stdin
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Payload is a bare event, not an SNS notification
    #[arg(long)]
    pub bare: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Format an SNS notification and POST it to the webhook
    Forward {
        #[command(flatten)]
        input: InputArgs,

        /// Webhook URL (overrides SLACK_WEBHOOK_URL and the config file)
        #[arg(long)]
        webhook_url: Option<String>,

        /// Print the Slack payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the Slack payload for an SNS notification
    Format {
        #[command(flatten)]
        input: InputArgs,

        /// Pretty-print the payload
        #[arg(long)]
        pretty: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
}
