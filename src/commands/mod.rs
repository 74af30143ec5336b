//! Subcommand implementations

use eyre::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};

use crate::cli::InputArgs;
use crate::config::Config;
use crate::event::trigger;

pub mod completions;
pub mod config;
pub mod format;
pub mod forward;

/// Read the trigger payload named by `input` (stdin by default) and unwrap the event
pub fn read_event(input: &InputArgs) -> Result<Value> {
    let text = match &input.input {
        Some(path) => {
            let path = Config::expand_path(path);
            fs::read_to_string(&path).context(format!("Failed to read payload from {}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };

    parse_payload(&text, input.bare)
}

/// Parse payload text, unwrapping the SNS envelope unless `bare`
pub fn parse_payload(text: &str, bare: bool) -> Result<Value> {
    if bare {
        trigger::parse_event(text)
    } else {
        trigger::parse_notification(text)
    }
}
