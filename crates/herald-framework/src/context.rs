//! The context handed to command handlers.
//!
//! A [`CommandContext`] is created per dispatched message. It carries the
//! message that triggered the command, the parsed [`Invocation`], and the
//! sink that can answer the sender.

use herald_core::{BoxedSink, InboundMessage, ReplyOptions, TransportResult};

use crate::command::{Flags, Invocation};

/// Everything a handler needs to act on one command.
#[derive(Clone)]
pub struct CommandContext {
    message: InboundMessage,
    sink: BoxedSink,
    invocation: Invocation,
}

impl CommandContext {
    /// Creates a new context.
    pub fn new(message: InboundMessage, sink: BoxedSink, invocation: Invocation) -> Self {
        Self {
            message,
            sink,
            invocation,
        }
    }

    /// The message that triggered the command.
    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    /// The sink the message arrived on.
    pub fn sink(&self) -> &BoxedSink {
        &self.sink
    }

    /// The parsed invocation.
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// The matched command name.
    pub fn command(&self) -> &str {
        &self.invocation.command
    }

    /// Positional arguments after the command name.
    pub fn args(&self) -> &[String] {
        &self.invocation.args
    }

    /// The positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.invocation.arg(index)
    }

    /// Parsed flags keyed by canonical name.
    pub fn flags(&self) -> &Flags {
        &self.invocation.flags
    }

    /// Replies to the triggering message with plain text.
    pub async fn reply(&self, content: &str) -> TransportResult<()> {
        self.sink
            .reply(&self.message, content, ReplyOptions::plain())
            .await
    }

    /// Replies to the triggering message with explicit options.
    pub async fn reply_with(&self, content: &str, options: ReplyOptions) -> TransportResult<()> {
        self.sink.reply(&self.message, content, options).await
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("message", &self.message)
            .field("invocation", &self.invocation)
            .finish_non_exhaustive()
    }
}
