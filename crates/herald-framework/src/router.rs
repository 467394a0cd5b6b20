//! Message routing.
//!
//! The [`Router`] owns the command registry and is the single entry point for
//! inbound messages. For each message it:
//!
//! 1. drops system and bot-authored messages,
//! 2. checks that the message addresses the bot (mention or prefix),
//! 3. strips the mention and prefix and finds the registered command,
//! 4. parses the remaining text against the command's schema,
//! 5. runs the handler, catching errors and panics.
//!
//! Every failure after step 3 is answered with exactly one reply carrying the
//! error text; the sender never sees silence for a known command. The router
//! also implements [`tower::Service`] over [`Delivery`] so transports can
//! drive it with the usual tower combinators.

use std::collections::HashMap;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use herald_core::{BoxedSink, InboundMessage, ReplyOptions};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::{Instrument, debug, debug_span, error, trace};

use crate::addressing::Addressing;
use crate::command::{CommandBuilder, CommandSchema, Invocation};
use crate::context::CommandContext;
use crate::error::{CommandError, CommandResult, HandlerError};

// ============================================================================
// Configuration
// ============================================================================

/// Router settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Text a message must start with to address the bot.
    pub command_prefix: String,

    /// Ignore leading mentions; only the prefix addresses the bot.
    pub ignore_mention: bool,

    /// Language tag of the code block used for error replies.
    ///
    /// `None` sends errors as plain text.
    pub error_code_block: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            command_prefix: "$>".to_string(),
            ignore_mention: false,
            error_code_block: Some("text".to_string()),
        }
    }
}

impl RouterConfig {
    /// Sets the command prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        self
    }

    /// Sets whether mentions are ignored.
    pub fn with_ignore_mention(mut self, ignore: bool) -> Self {
        self.ignore_mention = ignore;
        self
    }

    /// Sets the language tag used for error replies.
    pub fn with_error_code_block(mut self, lang: Option<String>) -> Self {
        self.error_code_block = lang;
        self
    }

    fn error_reply_options(&self) -> ReplyOptions {
        match &self.error_code_block {
            Some(lang) => ReplyOptions::code(lang.clone()),
            None => ReplyOptions::plain(),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Why a message did not reach a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Sent by the system or by a bot.
    Automated,
    /// Neither mentions the bot nor starts with the prefix.
    NotAddressed,
    /// Addressed, but no registered command matches.
    UnknownCommand,
}

/// What happened to a dispatched message.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The message was dropped without a reply.
    Ignored(IgnoreReason),
    /// The handler ran to completion.
    Handled {
        /// The matched command.
        command: String,
    },
    /// The command failed and the sender was told why.
    Failed {
        /// The matched command.
        command: String,
        /// The failure that was replied.
        error: CommandError,
    },
}

impl DispatchOutcome {
    /// Returns the matched command, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Ignored(_) => None,
            Self::Handled { command } | Self::Failed { command, .. } => Some(command),
        }
    }

    /// Returns `true` if the message was ignored.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }

    /// Returns `true` if the handler completed.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Returns `true` if the command failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// An inbound message together with the sink it arrived on.
///
/// The request type of the router's [`Service`] implementation.
#[derive(Clone)]
pub struct Delivery {
    pub message: InboundMessage,
    pub sink: BoxedSink,
}

impl Delivery {
    pub fn new(message: InboundMessage, sink: BoxedSink) -> Self {
        Self { message, sink }
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("message", &self.message)
            .field("self_id", &self.sink.self_id())
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

type Registry = HashMap<String, Arc<CommandSchema>>;

/// The command registry and dispatcher.
///
/// Cheap to clone; clones share the registry.
///
/// # Example
///
/// ```rust,ignore
/// let router = Router::new(RouterConfig::default())
///     .command("ping", CommandBuilder::new().handler(|_ctx: CommandContext| async { "pong" }));
///
/// let outcome = router.dispatch(message, sink).await;
/// ```
#[derive(Clone)]
pub struct Router {
    config: Arc<RouterConfig>,
    commands: Arc<RwLock<Registry>>,
}

impl Router {
    /// Creates a router with an empty registry.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config: Arc::new(config),
            commands: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Registers a command, returning the schema it replaced.
    pub fn add_command(
        &self,
        name: impl Into<String>,
        schema: CommandSchema,
    ) -> Option<Arc<CommandSchema>> {
        let name = name.into();
        debug!(
            command = %name,
            has_handler = schema.handler().is_some(),
            "Registering command"
        );
        self.commands.write().insert(name, Arc::new(schema))
    }

    /// Registers a command from a builder, consuming and returning the router.
    pub fn command(self, name: impl Into<String>, builder: CommandBuilder) -> Self {
        self.add_command(name, builder.build());
        self
    }

    /// Removes a command.
    pub fn remove_command(&self, name: &str) -> Option<Arc<CommandSchema>> {
        self.commands.write().remove(name)
    }

    /// Returns the registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// Finds the command `text` invokes.
    ///
    /// A name matches when it prefixes `text` and is followed by the end of
    /// the text or by whitespace. Among matches the longest name wins, so
    /// the result does not depend on registration order. Returns the name,
    /// its schema and the text after the name.
    pub fn lookup<'t>(&self, text: &'t str) -> Option<(String, Arc<CommandSchema>, &'t str)> {
        let commands = self.commands.read();
        commands
            .iter()
            .filter(|(name, _)| invokes(text, name))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, schema)| (name.clone(), Arc::clone(schema), &text[name.len()..]))
    }

    /// Routes one message.
    ///
    /// Never fails: every error is logged, replied to the sender and reported
    /// in the returned [`DispatchOutcome`].
    pub async fn dispatch(&self, message: InboundMessage, sink: BoxedSink) -> DispatchOutcome {
        if message.is_system || message.is_from_bot {
            trace!(message_id = %message.id, "Ignoring automated message");
            return DispatchOutcome::Ignored(IgnoreReason::Automated);
        }

        let (command, schema, input) = {
            let addressing = Addressing::new(
                sink.self_id(),
                &self.config.command_prefix,
                self.config.ignore_mention,
            );
            if !addressing.is_addressed(&message.text) {
                trace!(message_id = %message.id, "Message not addressed to the bot");
                return DispatchOutcome::Ignored(IgnoreReason::NotAddressed);
            }

            let body = addressing.strip(&message.text);
            match self.lookup(body) {
                Some((command, schema, rest)) => (command, schema, rest.to_string()),
                None => {
                    debug!(message_id = %message.id, body, "No command matches");
                    return DispatchOutcome::Ignored(IgnoreReason::UnknownCommand);
                }
            }
        };

        let span = debug_span!("dispatch", message_id = %message.id, command = %command);
        self.run(command, schema, input, message, sink)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        command: String,
        schema: Arc<CommandSchema>,
        input: String,
        message: InboundMessage,
        sink: BoxedSink,
    ) -> DispatchOutcome {
        match invoke(&command, &schema, &input, &message, &sink).await {
            Ok(()) => {
                debug!("Command handled");
                DispatchOutcome::Handled { command }
            }
            Err(err) => {
                error!(error = %err, "Command failed");
                let options = self.config.error_reply_options();
                if let Err(reply_err) = sink.reply(&message, &err.to_string(), options).await {
                    error!(error = %reply_err, "Failed to reply with command error");
                }
                DispatchOutcome::Failed {
                    command,
                    error: err,
                }
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("commands", &self.command_names())
            .finish()
    }
}

fn invokes(text: &str, name: &str) -> bool {
    text.strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

async fn invoke(
    command: &str,
    schema: &CommandSchema,
    input: &str,
    message: &InboundMessage,
    sink: &BoxedSink,
) -> CommandResult<()> {
    let (args, flags) = schema.parse(input)?;
    let handler = schema
        .handler()
        .cloned()
        .ok_or_else(|| CommandError::unconfigured(command))?;

    trace!(?args, ?flags, "Invoking handler");
    let ctx = CommandContext::new(
        message.clone(),
        Arc::clone(sink),
        Invocation::new(command, args, flags),
    );

    match AssertUnwindSafe(async move { handler(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CommandError::handler(command, err)),
        Err(payload) => Err(CommandError::handler(
            command,
            HandlerError::from_panic(payload),
        )),
    }
}

// ============================================================================
// tower::Service
// ============================================================================

impl Service<Delivery> for Router {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<DispatchOutcome, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, delivery: Delivery) -> Self::Future {
        let router = self.clone();
        async move { Ok(router.dispatch(delivery.message, delivery.sink).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::{MessageSink, TransportError, TransportResult};
    use parking_lot::Mutex;
    use tower::ServiceExt;

    use crate::command::FlagValue;

    #[derive(Default)]
    struct RecordingSink {
        replies: Mutex<Vec<(String, ReplyOptions)>>,
        fail: bool,
    }

    impl RecordingSink {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn replies(&self) -> Vec<(String, ReplyOptions)> {
            self.replies.lock().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        fn self_id(&self) -> &str {
            "42"
        }

        async fn reply(
            &self,
            _message: &InboundMessage,
            content: &str,
            options: ReplyOptions,
        ) -> TransportResult<()> {
            self.replies.lock().push((content.to_string(), options));
            if self.fail {
                return Err(TransportError::SendFailed("channel gone".into()));
            }
            Ok(())
        }
    }

    type Seen = Arc<Mutex<Vec<Invocation>>>;

    fn recording(seen: &Seen) -> CommandBuilder {
        let seen = Arc::clone(seen);
        CommandBuilder::new().handler(move |ctx: CommandContext| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(ctx.invocation().clone());
            }
        })
    }

    fn msg(text: &str) -> InboundMessage {
        InboundMessage::new("m1", "user", text)
    }

    async fn send(router: &Router, sink: &Arc<RecordingSink>, text: &str) -> DispatchOutcome {
        router.dispatch(msg(text), Arc::clone(sink) as BoxedSink).await
    }

    #[tokio::test]
    async fn test_unaddressed_message_runs_nothing() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("ping", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "ping").await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored(IgnoreReason::NotAddressed)
        ));
        assert!(seen.lock().is_empty());
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn test_prefix_invokes_with_args() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("cmd", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>cmd arg1 arg2").await;

        assert!(outcome.is_handled());
        assert_eq!(outcome.command(), Some("cmd"));
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].command, "cmd");
        assert_eq!(seen[0].args, ["arg1", "arg2"]);
    }

    #[tokio::test]
    async fn test_quoted_phrase_is_one_argument() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("say", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        send(&router, &sink, "$>say 'hello world'").await;

        assert_eq!(seen.lock()[0].args, ["hello world"]);
    }

    #[tokio::test]
    async fn test_apostrophe_is_plain_text() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("say", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>say I don't know").await;

        assert!(outcome.is_handled());
        assert_eq!(seen.lock()[0].args, ["I", "don't", "know"]);
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn test_mention_addresses_command() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("ping", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        assert!(send(&router, &sink, "<@42> ping").await.is_handled());
        assert!(send(&router, &sink, "<@!42> $>ping").await.is_handled());
        assert!(send(&router, &sink, "<@7> ping").await.is_ignored());
        assert_eq!(seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_ignore_mention_config() {
        let seen = Seen::default();
        let config = RouterConfig::default().with_ignore_mention(true);
        let router = Router::new(config).command("ping", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "<@42> ping").await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored(IgnoreReason::NotAddressed)
        ));
        assert!(send(&router, &sink, "$>ping").await.is_handled());
    }

    #[tokio::test]
    async fn test_later_prefix_is_kept_in_arguments() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("say", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        send(&router, &sink, "$>say price $>5").await;

        assert_eq!(seen.lock()[0].args, ["price", "$>5"]);
    }

    #[tokio::test]
    async fn test_automated_messages_are_ignored() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("ping", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let from_bot = router
            .dispatch(msg("$>ping").from_bot(true), Arc::clone(&sink) as BoxedSink)
            .await;
        let system = router
            .dispatch(msg("$>ping").system(true), Arc::clone(&sink) as BoxedSink)
            .await;

        assert!(matches!(
            from_bot,
            DispatchOutcome::Ignored(IgnoreReason::Automated)
        ));
        assert!(matches!(
            system,
            DispatchOutcome::Ignored(IgnoreReason::Automated)
        ));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_is_silent() {
        let router = Router::new(RouterConfig::default()).command("ping", CommandBuilder::new());
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>pong").await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Ignored(IgnoreReason::UnknownCommand)
        ));
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn test_command_requires_word_boundary() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("roll", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        assert!(send(&router, &sink, "$>rollover").await.is_ignored());
        assert!(send(&router, &sink, "$>roll").await.is_handled());
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_longest_command_wins() {
        let short = Seen::default();
        let long = Seen::default();
        let router = Router::new(RouterConfig::default())
            .command("tag", recording(&short))
            .command("tag list", recording(&long));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>tag list a").await;

        assert_eq!(outcome.command(), Some("tag list"));
        assert!(short.lock().is_empty());
        assert_eq!(long.lock()[0].args, ["a"]);

        send(&router, &sink, "$>tag lists").await;
        assert_eq!(short.lock()[0].args, ["lists"]);
    }

    #[tokio::test]
    async fn test_flags_reach_handler() {
        let seen = Seen::default();
        let builder = recording(&seen)
            .number("count")
            .array("tag")
            .count("v")
            .alias("verbose", "V")
            .boolean("verbose");
        let router = Router::new(RouterConfig::default()).command("note", builder);
        let sink = Arc::new(RecordingSink::default());

        send(&router, &sink, "$>note --count 3 --tag a --tag b -vvv -V").await;

        let seen = seen.lock();
        let flags = &seen[0].flags;
        assert_eq!(flags.number("count"), Some(3.0));
        assert_eq!(flags.list("tag"), [FlagValue::from("a"), FlagValue::from("b")]);
        assert_eq!(flags.count("v"), 3);
        assert!(flags.boolean("verbose"));
        assert!(!flags.contains("V"));
    }

    #[tokio::test]
    async fn test_missing_handler_replies_once() {
        let router = Router::new(RouterConfig::default()).command("broken", CommandBuilder::new());
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>broken now").await;

        let DispatchOutcome::Failed { command, error } = outcome else {
            panic!("expected an unconfigured handler failure");
        };
        assert_eq!(command, "broken");
        assert!(matches!(error, CommandError::UnconfiguredHandler { .. }));

        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].0.contains("CommandBuilder::handler"));
        assert_eq!(replies[0].1, ReplyOptions::code("text"));
    }

    #[tokio::test]
    async fn test_handler_error_is_replied() {
        let router = Router::new(RouterConfig::default()).command(
            "div",
            CommandBuilder::new()
                .handler(|_ctx: CommandContext| async { Err::<String, _>("division by zero") }),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>div 1 0").await;

        assert!(outcome.is_failed());
        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "command `div` failed: division by zero");
    }

    async fn explode(_ctx: CommandContext) {
        panic!("kaboom");
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let router = Router::new(RouterConfig::default()).command(
            "boom",
            CommandBuilder::new().handler(explode),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>boom").await;

        let DispatchOutcome::Failed {
            error: CommandError::Handler { source, .. },
            ..
        } = outcome
        else {
            panic!("expected a handler failure");
        };
        assert!(source.is_panic());
        assert_eq!(source.message(), "handler panicked: kaboom");
        assert_eq!(sink.replies().len(), 1);

        // The router keeps working after a panic.
        let outcome = send(&router, &sink, "$>boom").await;
        assert!(outcome.is_failed());
    }

    #[tokio::test]
    async fn test_malformed_input_is_replied() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("say", recording(&seen));
        let sink = Arc::new(RecordingSink::default());

        let outcome = send(&router, &sink, "$>say \"open").await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failed {
                error: CommandError::MalformedInput { .. },
                ..
            }
        ));
        assert!(seen.lock().is_empty());
        assert!(sink.replies()[0].0.contains("unterminated double quote"));
    }

    #[tokio::test]
    async fn test_plain_error_replies() {
        let config = RouterConfig::default().with_error_code_block(None);
        let router = Router::new(config).command("broken", CommandBuilder::new());
        let sink = Arc::new(RecordingSink::default());

        send(&router, &sink, "$>broken").await;

        assert_eq!(sink.replies()[0].1, ReplyOptions::plain());
    }

    #[tokio::test]
    async fn test_failed_error_reply_is_only_logged() {
        let router = Router::new(RouterConfig::default()).command("broken", CommandBuilder::new());
        let sink = Arc::new(RecordingSink::failing());

        let outcome = send(&router, &sink, "$>broken").await;

        assert!(outcome.is_failed());
        assert_eq!(sink.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_answer_fails_the_dispatch() {
        let router = Router::new(RouterConfig::default()).command(
            "ping",
            CommandBuilder::new().handler(|_ctx: CommandContext| async move { "pong" }),
        );
        let sink = Arc::new(RecordingSink::failing());

        let outcome = send(&router, &sink, "$>ping").await;

        let DispatchOutcome::Failed { command, error } = outcome else {
            panic!("expected a failed dispatch");
        };
        assert_eq!(command, "ping");
        assert!(error.to_string().contains("failed to send reply"));
        let replies = sink.replies();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].0, "pong");
    }

    #[tokio::test]
    async fn test_same_input_parses_identically() {
        let seen = Seen::default();
        let builder = recording(&seen).number("n").array("tag").default("n", 1);
        let router = Router::new(RouterConfig::default()).command("x", builder);
        let sink = Arc::new(RecordingSink::default());

        for _ in 0..2 {
            send(&router, &sink, "$>x a 'b c' --tag t -- --n 2").await;
        }

        let seen = seen.lock();
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0].args, ["a", "b c", "--n", "2"]);
        assert_eq!(seen[0].flags.number("n"), Some(1.0));
    }

    #[test]
    fn test_registry_management() {
        let router = Router::new(RouterConfig::default());
        assert!(router.add_command("b", CommandBuilder::new().build()).is_none());
        assert!(router.add_command("a", CommandBuilder::new().build()).is_none());
        assert!(router.add_command("a", CommandBuilder::new().build()).is_some());

        assert_eq!(router.command_names(), ["a", "b"]);
        assert_eq!(router.command_count(), 2);

        assert!(router.remove_command("a").is_some());
        assert!(router.remove_command("a").is_none());
        assert_eq!(router.command_count(), 1);
    }

    #[test]
    fn test_lookup_returns_remainder() {
        let router = Router::new(RouterConfig::default()).command("say", CommandBuilder::new());

        let (name, _, rest) = router.lookup("say hi there").unwrap();
        assert_eq!(name, "say");
        assert_eq!(rest, " hi there");
        assert!(router.lookup("sayhi").is_none());
    }

    #[test]
    fn test_router_config_deserialize_defaults() {
        let config: RouterConfig = serde_json::from_str(r#"{"command_prefix": "!"}"#).unwrap();
        assert_eq!(config.command_prefix, "!");
        assert!(!config.ignore_mention);
        assert_eq!(config.error_code_block.as_deref(), Some("text"));
    }

    #[tokio::test]
    async fn test_service_oneshot() {
        let seen = Seen::default();
        let router = Router::new(RouterConfig::default()).command("ping", recording(&seen));
        let sink: BoxedSink = Arc::new(RecordingSink::default());

        let outcome = router
            .clone()
            .oneshot(Delivery::new(msg("$>ping"), sink))
            .await
            .unwrap();

        assert!(outcome.is_handled());
        assert_eq!(seen.lock().len(), 1);
        // Clones share the registry.
        assert_eq!(router.command_count(), 1);
    }
}
