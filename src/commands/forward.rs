//! `ecs-notify forward`: the full invocation pipeline
//!
//! parse trigger -> format -> serialize -> POST -> print `{statusCode, body}`

use eyre::{Context, Result};
use serde_json::Value;
use std::io::{self, Write};

use crate::cli::InputArgs;
use crate::config::Config;
use crate::delivery::{Forwarder, UreqTransport, WebhookTransport};

pub fn run(input: &InputArgs, webhook_url: Option<String>, dry_run: bool, config: &Config) -> Result<()> {
    let event = super::read_event(input)?;
    let mut stdout = io::stdout().lock();

    if dry_run {
        log::info!("Dry run, not sending");
        return super::format::write_payload(&event, &config.format_options(), true, &mut stdout);
    }

    let config = config.clone().with_webhook_override(webhook_url);
    let forwarder = Forwarder::new(
        config.webhook_url()?,
        config.format_options(),
        UreqTransport::new(config.timeout()),
    );

    deliver(&forwarder, &event, &mut stdout)
}

/// Forward one event and write the webhook's answer as JSON.
///
/// A non-2xx answer is still written and still `Ok`; only transport
/// failures are errors.
pub fn deliver<T: WebhookTransport, W: Write>(forwarder: &Forwarder<T>, event: &Value, out: &mut W) -> Result<()> {
    let response = forwarder.forward(event)?;
    let text = serde_json::to_string(&response).context("Failed to serialize delivery response")?;
    writeln!(out, "{}", text).context("Failed to write delivery response")?;
    Ok(())
}
