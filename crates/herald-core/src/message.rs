//! Inbound message model and reply options.

use serde::{Deserialize, Serialize};

/// A text message delivered by a transport.
///
/// Only the fields the router needs are modelled here; transports keep any
/// richer metadata on their own side and map it back through the message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Transport-specific message identifier.
    pub id: String,
    /// The raw message text.
    pub text: String,
    /// Stable identifier of the author.
    pub author_id: String,
    /// Set for messages generated by the platform itself (joins, pins, ...).
    #[serde(default)]
    pub is_system: bool,
    /// Set when the author is an automated account.
    #[serde(default)]
    pub is_from_bot: bool,
}

impl InboundMessage {
    /// Creates a regular user message.
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author_id: author_id.into(),
            is_system: false,
            is_from_bot: false,
        }
    }

    /// Marks the message as a platform system message.
    pub fn system(mut self, is_system: bool) -> Self {
        self.is_system = is_system;
        self
    }

    /// Marks the message as sent by an automated account.
    pub fn from_bot(mut self, is_from_bot: bool) -> Self {
        self.is_from_bot = is_from_bot;
        self
    }
}

/// Rendering hints passed along with a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOptions {
    /// Render the content as a fenced code block with this language tag.
    #[serde(default)]
    pub code: Option<String>,
}

impl ReplyOptions {
    /// Plain text reply.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Reply rendered as a fenced code block.
    pub fn code(lang: impl Into<String>) -> Self {
        Self {
            code: Some(lang.into()),
        }
    }

    /// Applies the options to `content`.
    ///
    /// Sinks whose platform has no native code formatting can use this to get
    /// a markdown fence.
    pub fn render(&self, content: &str) -> String {
        match &self.code {
            Some(lang) => format!("```{lang}\n{content}\n```"),
            None => content.to_string(),
        }
    }
}
