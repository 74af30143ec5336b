//! Webhook delivery
//!
//! One POST per invocation, no retries. Transport errors propagate; any HTTP
//! status the webhook answers with (2xx or not) comes back as a normal
//! `DeliveryResponse` for the caller to report.

use eyre::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::slack::{self, FormatOptions, SlackMessage};

/// Webhook status and body, passed through untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub status_code: u16,
    pub body: String,
}

impl DeliveryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Something that can POST a JSON body to a URL
pub trait WebhookTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<DeliveryResponse>;
}

/// Blocking transport backed by a `ureq` agent
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        // Status codes are data here, not errors
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WebhookTransport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<DeliveryResponse> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .context(format!("Failed to POST to {}", redact_url(url)))?;

        let status_code = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .context("Failed to read webhook response")?;

        Ok(DeliveryResponse { status_code, body })
    }
}

/// Formats inbound events and delivers them to a single webhook
pub struct Forwarder<T: WebhookTransport> {
    webhook_url: String,
    options: FormatOptions,
    transport: T,
}

impl<T: WebhookTransport> Forwarder<T> {
    pub fn new(webhook_url: impl Into<String>, options: FormatOptions, transport: T) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            options,
            transport,
        }
    }

    /// Format `event` and POST it, returning the webhook's answer verbatim
    pub fn forward(&self, event: &Value) -> Result<DeliveryResponse> {
        let message = slack::format(event, &self.options);
        self.send(&message)
    }

    pub fn send(&self, message: &SlackMessage) -> Result<DeliveryResponse> {
        let body = serde_json::to_string(message).context("Failed to serialize Slack message")?;

        if message.is_empty() {
            log::info!("Message has no blocks; sending it anyway");
        }

        log::info!(
            "Posting {} block(s) ({} bytes) to {}",
            message.blocks.len(),
            body.len(),
            redact_url(&self.webhook_url)
        );

        let response = self.transport.post_json(&self.webhook_url, &body)?;

        if response.is_success() {
            log::info!("Webhook answered {}", response.status_code);
        } else {
            log::warn!("Webhook answered {}: {}", response.status_code, response.body);
        }

        Ok(response)
    }
}

static URL_ORIGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<origin>[A-Za-z][A-Za-z0-9+.-]*://[^/?#]+)(?P<rest>.*)$").unwrap());

/// Strip the path and query from a URL before it goes anywhere visible.
///
/// Incoming-webhook URLs carry their secret in the path.
pub fn redact_url(url: &str) -> String {
    match URL_ORIGIN.captures(url) {
        Some(caps) if caps["rest"].is_empty() => caps["origin"].to_string(),
        Some(caps) => format!("{}/***", &caps["origin"]),
        None => "***".to_string(),
    }
}
