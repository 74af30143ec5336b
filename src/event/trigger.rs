//! SNS notification envelope
//!
//! The event we care about is JSON text inside `Records[0].Sns.Message`, so it
//! takes two parses to reach it.

use eyre::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// SNS notification as delivered to a subscriber
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(rename = "Sns")]
    pub sns: SnsMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsMessage {
    pub message: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Parse an SNS notification and return the inbound event of its first record
pub fn parse_notification(text: &str) -> Result<Value> {
    let notification: Notification = serde_json::from_str(text).context("Failed to parse notification envelope")?;

    let mut records = notification.records.into_iter();
    let record = records
        .next()
        .ok_or_else(|| eyre::eyre!("Notification contains no records"))?;

    let extra = records.count();
    if extra > 0 {
        log::warn!("Notification carries {} extra record(s); only the first is forwarded", extra);
    }

    let sns = record.sns;
    log::debug!(
        "SNS message id={} topic={} subject={} timestamp={}",
        sns.message_id.as_deref().unwrap_or("-"),
        sns.topic_arn.as_deref().unwrap_or("-"),
        sns.subject.as_deref().unwrap_or("-"),
        sns.timestamp.as_deref().unwrap_or("-"),
    );

    parse_event(&sns.message).context("Failed to parse SNS message")
}

/// Parse a bare inbound event, with no SNS envelope around it
pub fn parse_event(text: &str) -> Result<Value> {
    let event: Value = serde_json::from_str(text).context("Failed to parse event JSON")?;
    Ok(event)
}
