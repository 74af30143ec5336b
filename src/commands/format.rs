//! `ecs-notify format`: render the Slack payload without sending it

use eyre::{Context, Result};
use serde_json::Value;
use std::io::{self, Write};

use crate::cli::InputArgs;
use crate::config::Config;
use crate::slack::{self, FormatOptions};

pub fn run(input: &InputArgs, pretty: bool, config: &Config) -> Result<()> {
    let event = super::read_event(input)?;
    let mut stdout = io::stdout().lock();
    write_payload(&event, &config.format_options(), pretty, &mut stdout)
}

/// Serialize the Slack message for `event` onto `out`
pub fn write_payload<W: Write>(event: &Value, options: &FormatOptions, pretty: bool, out: &mut W) -> Result<()> {
    let message = slack::format(event, options);
    log::info!("Formatted event into {} block(s)", message.blocks.len());

    let text = if pretty {
        serde_json::to_string_pretty(&message)
    } else {
        serde_json::to_string(&message)
    }
    .context("Failed to serialize Slack message")?;

    writeln!(out, "{}", text).context("Failed to write payload")?;
    Ok(())
}
