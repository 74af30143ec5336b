//! Slack Block Kit message model
//!
//! Only the handful of block shapes the formatter emits are modelled. Field
//! order in the serialized JSON follows declaration order, with the `type`
//! tag first.

use serde::{Deserialize, Serialize};

pub mod format;

pub use format::{FormatOptions, format};

/// Payload accepted by a Slack incoming webhook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
}

impl SlackMessage {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A top-level layout block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Two-column grid of short markdown fields
    Section { fields: Vec<TextObject> },
    /// Rich text container
    RichText { elements: Vec<RichTextElement> },
}

impl Block {
    pub fn section(fields: Vec<TextObject>) -> Self {
        Block::Section { fields }
    }

    /// Rich text block holding one preformatted run of text
    pub fn preformatted(text: impl Into<String>) -> Self {
        Block::RichText {
            elements: vec![RichTextElement::RichTextPreformatted {
                elements: vec![RichTextSpan::Text { text: text.into() }],
            }],
        }
    }
}

/// Text object kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    Mrkdwn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

impl TextObject {
    /// Markdown field rendered as a bold label above its value
    pub fn labeled(label: &str, value: &str) -> Self {
        Self {
            kind: TextKind::Mrkdwn,
            text: format!("*{}:*\n{}", label, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextPreformatted { elements: Vec<RichTextSpan> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextSpan {
    Text { text: String },
}
