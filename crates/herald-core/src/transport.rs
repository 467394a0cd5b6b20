//! The `MessageSource` / `MessageSink` pair.
//!
//! A transport implements both sides: the source pushes every inbound
//! message into the [`MessageDispatcher`] it was given, together with the
//! sink that can answer it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::message::{InboundMessage, ReplyOptions};

/// Callback the runtime hands to a [`MessageSource`].
///
/// Invoked once per inbound message. Implementations must return quickly;
/// the runtime's dispatcher spawns the actual work.
pub type MessageDispatcher = Arc<dyn Fn(InboundMessage, BoxedSink) + Send + Sync>;

/// The sending half of a transport.
#[async_trait]
pub trait MessageSink: Send + Sync + 'static {
    /// Returns the bot's own stable identifier.
    ///
    /// Used to recognise mentions of the bot (`<@id>` / `<@!id>`).
    fn self_id(&self) -> &str;

    /// Sends `content` as a reply to `message`.
    async fn reply(
        &self,
        message: &InboundMessage,
        content: &str,
        options: ReplyOptions,
    ) -> TransportResult<()>;
}

/// A shared sink trait object.
pub type BoxedSink = Arc<dyn MessageSink>;

/// The receiving half of a transport.
#[async_trait]
pub trait MessageSource: Send + Sync + 'static {
    /// Returns the source name, used in logs.
    fn name(&self) -> &str;

    /// Registers `dispatcher` and starts delivering messages to it.
    ///
    /// Should return once delivery is set up; long-running reading belongs on
    /// a spawned task.
    async fn on_message(&self, dispatcher: MessageDispatcher) -> TransportResult<()>;

    /// Stops delivery.
    ///
    /// The default implementation does nothing.
    async fn shutdown(&self) -> TransportResult<()> {
        Ok(())
    }
}

/// A shared source trait object.
pub type BoxedSource = Arc<dyn MessageSource>;
