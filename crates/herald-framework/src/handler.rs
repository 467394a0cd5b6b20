//! Handler system for commands.
//!
//! Handlers are plain async functions (or closures) taking a
//! [`CommandContext`] and returning anything that implements
//! [`HandlerResponse`]:
//!
//! ```rust,ignore
//! // No return value
//! async fn ping(ctx: CommandContext) {
//!     let _ = ctx.reply("pong").await;
//! }
//!
//! // Return a String - it is sent as the reply
//! async fn echo(ctx: CommandContext) -> String {
//!     ctx.args().join(" ")
//! }
//!
//! // Return a Result - errors become a failure reply
//! async fn add(ctx: CommandContext) -> Result<String, String> {
//!     let total: f64 = ctx
//!         .args()
//!         .iter()
//!         .map(|a| a.parse::<f64>().map_err(|_| format!("`{a}` is not a number")))
//!         .sum::<Result<_, _>>()?;
//!     Ok(total.to_string())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::warn;

use crate::context::CommandContext;
use crate::error::HandlerError;

// ============================================================================
// HandlerResponse
// ============================================================================

/// A trait for types that can be returned from handlers.
#[async_trait]
pub trait HandlerResponse: Send + 'static {
    /// Performs the response's side effects (e.g. sending a reply).
    ///
    /// Returning an error marks the invocation as failed.
    async fn process_response(self, ctx: &CommandContext) -> Result<(), HandlerError>;
}

/// Implementation for `()` - no response needed.
#[async_trait]
impl HandlerResponse for () {
    async fn process_response(self, _ctx: &CommandContext) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Implementation for `String` - sent as a reply.
///
/// A reply the transport rejects fails the invocation.
#[async_trait]
impl HandlerResponse for String {
    async fn process_response(self, ctx: &CommandContext) -> Result<(), HandlerError> {
        ctx.reply(&self).await.map_err(|e| {
            warn!(command = ctx.command(), error = %e, "Failed to send reply");
            HandlerError::new(format!("failed to send reply: {e}"))
        })
    }
}

/// Implementation for `&'static str` - sent as a reply.
#[async_trait]
impl HandlerResponse for &'static str {
    async fn process_response(self, ctx: &CommandContext) -> Result<(), HandlerError> {
        self.to_string().process_response(ctx).await
    }
}

/// Implementation for `Option<T>` where T implements HandlerResponse.
///
/// On Some, the inner value's response is handled. On None, no action is taken.
#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn process_response(self, ctx: &CommandContext) -> Result<(), HandlerError> {
        match self {
            Some(t) => t.process_response(ctx).await,
            None => Ok(()),
        }
    }
}

/// Implementation for `Result<T, E>` where T implements HandlerResponse.
///
/// On Ok, the inner value's response is handled. On Err, the error becomes a
/// [`HandlerError`] carrying its `Display` text.
#[async_trait]
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: std::fmt::Display + Send + 'static,
{
    async fn process_response(self, ctx: &CommandContext) -> Result<(), HandlerError> {
        match self {
            Ok(t) => t.process_response(ctx).await,
            Err(e) => Err(HandlerError::new(e.to_string())),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for command handlers.
///
/// Implemented for every `async fn(CommandContext) -> R` and closure of that
/// shape where `R: HandlerResponse`.
pub trait Handler<R>: Clone + Send + Sync + 'static {
    /// Runs the handler and processes its response.
    fn call(self, ctx: CommandContext) -> BoxFuture<'static, Result<(), HandlerError>>;
}

impl<F, Fut, R> Handler<R> for F
where
    F: FnOnce(CommandContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResponse,
{
    fn call(self, ctx: CommandContext) -> BoxFuture<'static, Result<(), HandlerError>> {
        async move {
            let res = (self)(ctx.clone()).await;
            res.process_response(&ctx).await
        }
        .boxed()
    }
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in schemas
// ============================================================================

/// A type-erased handler.
///
/// Internally a closure that captures the original handler and calls it
/// with a cloned copy on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(CommandContext) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, R>(f: F) -> BoxedHandler
where
    F: Handler<R>,
    R: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Invocation;
    use herald_core::{InboundMessage, MessageSink, ReplyOptions, TransportResult};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        fn self_id(&self) -> &str {
            "bot"
        }

        async fn reply(
            &self,
            _message: &InboundMessage,
            content: &str,
            _options: ReplyOptions,
        ) -> TransportResult<()> {
            self.replies.lock().push(content.to_string());
            Ok(())
        }
    }

    fn context(sink: Arc<RecordingSink>) -> CommandContext {
        CommandContext::new(
            InboundMessage::new("1", "user", "$>test a b"),
            sink,
            Invocation::new("test", vec!["a".into(), "b".into()], Default::default()),
        )
    }

    #[test]
    fn test_string_response_replies() {
        let sink = Arc::new(RecordingSink::default());
        let handler = into_handler(|ctx: CommandContext| async move { ctx.args().join("+") });

        let result = tokio_test::block_on(handler(context(Arc::clone(&sink))));

        assert!(result.is_ok());
        assert_eq!(*sink.replies.lock(), vec!["a+b".to_string()]);
    }

    #[test]
    fn test_unit_response_is_silent() {
        let sink = Arc::new(RecordingSink::default());
        let handler = into_handler(|_ctx: CommandContext| async move {});

        assert!(tokio_test::block_on(handler(context(Arc::clone(&sink)))).is_ok());
        assert!(sink.replies.lock().is_empty());
    }

    #[test]
    fn test_err_response_becomes_handler_error() {
        let sink = Arc::new(RecordingSink::default());
        let handler = into_handler(|_ctx: CommandContext| async move {
            Err::<String, _>("division by zero")
        });

        let err = tokio_test::block_on(handler(context(Arc::clone(&sink)))).unwrap_err();

        assert_eq!(err.message(), "division by zero");
        assert!(!err.is_panic());
        assert!(sink.replies.lock().is_empty());
    }

    #[test]
    fn test_option_none_is_silent() {
        let sink = Arc::new(RecordingSink::default());
        let handler = into_handler(|_ctx: CommandContext| async move { None::<String> });

        assert!(tokio_test::block_on(handler(context(Arc::clone(&sink)))).is_ok());
        assert!(sink.replies.lock().is_empty());
    }

    #[test]
    fn test_handler_can_be_called_repeatedly() {
        let sink = Arc::new(RecordingSink::default());
        let handler = into_handler(|_ctx: CommandContext| async move { "ok" });

        for _ in 0..3 {
            assert!(tokio_test::block_on(handler(context(Arc::clone(&sink)))).is_ok());
        }
        assert_eq!(sink.replies.lock().len(), 3);
    }
}
