//! Error types for command parsing and dispatch.

use std::any::Any;

use thiserror::Error;

/// Errors raised while turning a message into a handler call.
///
/// The router catches every one of these at the dispatch boundary and
/// answers the sender with its `Display` text.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The command text could not be tokenized.
    #[error("malformed input: {message}")]
    MalformedInput {
        /// What went wrong, with the position of the offending quote.
        message: String,
    },

    /// The command was registered without a handler.
    #[error(
        "command `{command}` has no handler; set one with `CommandBuilder::handler` before registering it"
    )]
    UnconfiguredHandler {
        /// The command name.
        command: String,
    },

    /// The handler returned an error or panicked.
    #[error("command `{command}` failed: {source}")]
    Handler {
        /// The command name.
        command: String,
        /// The captured failure.
        source: HandlerError,
    },
}

impl CommandError {
    /// Creates a malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates an unconfigured handler error.
    pub fn unconfigured(command: impl Into<String>) -> Self {
        Self::UnconfiguredHandler {
            command: command.into(),
        }
    }

    /// Wraps a handler failure for `command`.
    pub fn handler(command: impl Into<String>, source: HandlerError) -> Self {
        Self::Handler {
            command: command.into(),
            source,
        }
    }
}

/// A failure produced by a user-supplied handler.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    panicked: bool,
}

impl HandlerError {
    /// Creates a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            panicked: false,
        }
    }

    /// Converts a panic payload into a handler error.
    ///
    /// Payloads that are neither `&str` nor `String` become a generic message.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self {
            message: format!("handler panicked: {detail}"),
            panicked: true,
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the handler panicked.
    pub fn is_panic(&self) -> bool {
        self.panicked
    }
}

/// Result type for command operations.
pub type CommandResult<T> = Result<T, CommandError>;
