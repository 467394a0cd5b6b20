//! Runtime orchestration.
//!
//! [`HeraldRuntime`] ties the pieces together: it loads configuration,
//! initializes logging, owns the [`Router`] and starts every registered
//! [`MessageSource`]. Each inbound message is dispatched on its own tokio
//! task through the router's `tower::Service` implementation. Those tasks
//! are tracked, and [`HeraldRuntime::stop`] waits for them to finish.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! let runtime = HeraldRuntime::builder()
//!     .config_file("herald.toml")
//!     .build()?;
//!
//! runtime.add_command("ping", CommandBuilder::new().handler(ping).build());
//! runtime.register_source(my_source).await;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use herald_core::{BoxedSink, BoxedSource, InboundMessage, MessageDispatcher, MessageSource};
use herald_framework::{CommandSchema, Delivery, DispatchOutcome, Router};
use tokio::signal;
use tokio::sync::RwLock;
use tower::ServiceExt;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, ConfigResult, HeraldConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The main Herald runtime.
///
/// ```rust,ignore
/// let runtime = HeraldRuntime::new();
/// runtime.add_command("say", say_schema);
/// runtime.register_source(StdinSource::new()).await;
/// runtime.run().await?;
/// ```
pub struct HeraldRuntime {
    config: HeraldConfig,
    router: Router,
    sources: Arc<RwLock<Vec<BoxedSource>>>,
    running: Arc<RwLock<bool>>,
    tasks: TaskTracker,
    counters: Arc<Counters>,
}

impl HeraldRuntime {
    /// Creates a runtime, loading configuration from the default locations.
    ///
    /// Falls back to defaults if the configuration cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new().load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config ({e}), using defaults");
            HeraldConfig::default()
        });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration, initializing logging.
    pub fn from_config(config: &HeraldConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            command_prefix = %config.router.command_prefix,
            ignore_mention = config.router.ignore_mention,
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            router: Router::new(config.router.clone()),
            sources: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(RwLock::new(false)),
            tasks: TaskTracker::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registers a command, replacing any command with the same name.
    pub fn add_command(&self, name: impl Into<String>, schema: CommandSchema) {
        let name = name.into();
        if self.router.add_command(name.clone(), schema).is_some() {
            warn!(command = %name, "Replaced an existing command");
        }
    }

    /// Registers a message source.
    pub async fn register_source<S: MessageSource>(&self, source: S) {
        self.register_source_boxed(Arc::new(source)).await;
    }

    /// Registers a shared message source.
    pub async fn register_source_boxed(&self, source: BoxedSource) {
        info!(source = source.name(), "Registered message source");
        self.sources.write().await.push(source);
    }

    /// Returns the number of registered sources.
    pub async fn source_count(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Returns whether the runtime is currently running.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Returns a snapshot of the dispatch counters.
    pub fn stats(&self) -> RuntimeStats {
        self.counters.snapshot()
    }

    /// Creates the dispatcher handed to every source.
    ///
    /// Spawns one tracked task per message; the caller never waits for the
    /// handler.
    fn create_dispatcher(&self) -> MessageDispatcher {
        let router = self.router.clone();
        let counters = Arc::clone(&self.counters);
        let tasks = self.tasks.clone();

        Arc::new(move |message: InboundMessage, sink: BoxedSink| {
            let router = router.clone();
            let counters = Arc::clone(&counters);
            counters.dispatched.fetch_add(1, Ordering::Relaxed);

            tasks.spawn(async move {
                let outcome = router
                    .oneshot(Delivery::new(message, sink))
                    .await
                    .unwrap_or_else(|never| match never {});
                counters.record(&outcome);
            });
        })
    }

    /// Starts every registered source.
    ///
    /// A source that fails to start is logged and skipped. Fails only when
    /// no source is running afterwards.
    pub async fn start(&self) -> RuntimeResult<()> {
        {
            let mut running = self.running.write().await;
            if *running {
                warn!("Runtime is already running");
                return Ok(());
            }
            *running = true;
        }
        self.tasks.reopen();

        info!(commands = self.router.command_count(), "Starting Herald runtime");

        let sources = self.sources.read().await;
        let mut started = 0;
        for source in sources.iter() {
            if let Err(e) = source.on_message(self.create_dispatcher()).await {
                error!(source = source.name(), error = %e, "Failed to start message source");
                continue;
            }
            info!(source = source.name(), "Message source started");
            started += 1;
        }

        if started == 0 {
            *self.running.write().await = false;
            return Err(RuntimeError::NoSources {
                registered: sources.len(),
            });
        }

        info!(sources = started, "Runtime started");
        Ok(())
    }

    /// Shuts down every source, then waits for in-flight dispatches.
    pub async fn stop(&self) -> RuntimeResult<()> {
        {
            let mut running = self.running.write().await;
            if !*running {
                warn!("Runtime is not running");
                return Ok(());
            }
            *running = false;
        }

        info!("Stopping Herald runtime");

        let sources = self.sources.read().await;
        let results = join_all(sources.iter().map(|source| source.shutdown())).await;
        for (source, result) in sources.iter().zip(results) {
            if let Err(e) = result {
                error!(source = source.name(), error = %e, "Error during source shutdown");
            }
        }
        drop(sources);

        self.tasks.close();
        if !self.tasks.is_empty() {
            info!(in_flight = self.tasks.len(), "Waiting for in-flight dispatches");
        }
        self.tasks.wait().await;

        info!(stats = %self.stats(), "Runtime stopped");
        Ok(())
    }

    /// Runs until Ctrl+C or SIGTERM is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start().await?;

        info!("Herald runtime is now running. Press Ctrl+C to stop.");
        let waited = wait_for_shutdown().await;

        self.stop().await?;
        waited
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        self.stop().await
    }
}

impl Default for HeraldRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// Stats
// =============================================================================

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    handled: AtomicU64,
    ignored: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Ignored(_) => &self.ignored,
            DispatchOutcome::Handled { .. } => &self.handled,
            DispatchOutcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        debug!(?outcome, "Dispatch finished");
    }

    fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Dispatch counters since the runtime was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Messages handed to the router.
    pub dispatched: u64,
    /// Messages whose handler completed.
    pub handled: u64,
    /// Messages dropped without a reply.
    pub ignored: u64,
    /// Messages answered with an error.
    pub failed: u64,
}

impl RuntimeStats {
    /// Messages still being processed.
    pub fn in_flight(&self) -> u64 {
        self.dispatched
            .saturating_sub(self.handled + self.ignored + self.failed)
    }
}

impl std::fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Messages: {} dispatched ({} handled, {} ignored, {} failed)",
            self.dispatched, self.handled, self.ignored, self.failed
        )
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`HeraldRuntime`] with custom configuration.
///
/// ```rust,ignore
/// let runtime = HeraldRuntime::builder()
///     .config_file("config/herald.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Overrides a single configuration key.
    pub fn set<T: serde::Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<HeraldRuntime> {
        let config = self.config_loader.load()?;
        Ok(HeraldRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::{MessageSink, ReplyOptions, TransportError, TransportResult};
    use herald_framework::{CommandBuilder, CommandContext};
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingSink {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        fn self_id(&self) -> &str {
            "99"
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

    /// Delivers everything sent on a channel.
    struct ChannelSource {
        receiver: Mutex<Option<mpsc::UnboundedReceiver<InboundMessage>>>,
        sink: Arc<RecordingSink>,
        shut_down: Mutex<bool>,
    }

    impl ChannelSource {
        fn new(sink: Arc<RecordingSink>) -> (Self, mpsc::UnboundedSender<InboundMessage>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let source = Self {
                receiver: Mutex::new(Some(rx)),
                sink,
                shut_down: Mutex::new(false),
            };
            (source, tx)
        }
    }

    #[async_trait]
    impl MessageSource for ChannelSource {
        fn name(&self) -> &str {
            "channel"
        }

        async fn on_message(&self, dispatcher: MessageDispatcher) -> TransportResult<()> {
            let mut receiver = self
                .receiver
                .lock()
                .take()
                .ok_or_else(|| TransportError::NotAvailable {
                    name: "channel".into(),
                })?;
            let sink: BoxedSink = self.sink.clone();
            tokio::spawn(async move {
                while let Some(message) = receiver.recv().await {
                    dispatcher(message, Arc::clone(&sink));
                }
            });
            Ok(())
        }

        async fn shutdown(&self) -> TransportResult<()> {
            *self.shut_down.lock() = true;
            Ok(())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl MessageSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn on_message(&self, _dispatcher: MessageDispatcher) -> TransportResult<()> {
            Err(TransportError::ConnectionClosed {
                reason: "refused".into(),
            })
        }
    }

    fn runtime() -> HeraldRuntime {
        HeraldRuntime::from_config(&HeraldConfig::default())
    }

    async fn settle(runtime: &HeraldRuntime, expected: u64) {
        while runtime.stats().dispatched < expected || runtime.stats().in_flight() > 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_run_until_dispatches_messages() {
        let runtime = runtime();
        runtime.add_command(
            "echo",
            CommandBuilder::new()
                .handler(|ctx: CommandContext| async move { ctx.args().join(" ") })
                .build(),
        );
        runtime.add_command("broken", CommandBuilder::new().build());

        let sink = Arc::new(RecordingSink::default());
        let (source, tx) = ChannelSource::new(Arc::clone(&sink));
        runtime.register_source(source).await;

        for text in ["$>echo hi there", "hello", "$>missing", "$>broken"] {
            tx.send(InboundMessage::new("1", "user", text)).unwrap();
        }

        runtime.run_until(settle(&runtime, 4)).await.unwrap();

        let stats = runtime.stats();
        assert_eq!(stats.dispatched, 4);
        assert_eq!(stats.handled, 1);
        assert_eq!(stats.ignored, 2);
        assert_eq!(stats.failed, 1);
        assert!(!runtime.is_running().await);

        let replies = sink.replies.lock();
        assert_eq!(replies.len(), 2);
        assert!(replies.contains(&"hi there".to_string()));
    }

    #[tokio::test]
    async fn test_stop_waits_for_slow_handlers() {
        let runtime = runtime();
        runtime.add_command(
            "slow",
            CommandBuilder::new()
                .handler(|_ctx: CommandContext| async move {
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    "done"
                })
                .build(),
        );

        let sink = Arc::new(RecordingSink::default());
        let (source, tx) = ChannelSource::new(Arc::clone(&sink));
        runtime.register_source(source).await;
        tx.send(InboundMessage::new("1", "user", "$>slow")).unwrap();

        runtime
            .run_until(async {
                while runtime.stats().dispatched < 1 {
                    tokio::task::yield_now().await;
                }
            })
            .await
            .unwrap();

        assert_eq!(runtime.stats().handled, 1);
        assert_eq!(runtime.stats().in_flight(), 0);
        assert_eq!(*sink.replies.lock(), vec!["done".to_string()]);
    }

    #[tokio::test]
    async fn test_runtime_restarts_after_stop() {
        let runtime = runtime();
        runtime.add_command(
            "echo",
            CommandBuilder::new()
                .handler(|ctx: CommandContext| async move { ctx.args().join(" ") })
                .build(),
        );
        let sink = Arc::new(RecordingSink::default());
        let (first, first_tx) = ChannelSource::new(Arc::clone(&sink));
        runtime.register_source(first).await;

        first_tx.send(InboundMessage::new("1", "user", "$>echo one")).unwrap();
        runtime.run_until(settle(&runtime, 1)).await.unwrap();

        let (second, second_tx) = ChannelSource::new(Arc::clone(&sink));
        runtime.register_source(second).await;
        second_tx.send(InboundMessage::new("2", "user", "$>echo two")).unwrap();
        runtime.run_until(settle(&runtime, 2)).await.unwrap();

        assert_eq!(runtime.stats().handled, 2);
        assert_eq!(sink.replies.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_start_without_sources_fails() {
        let runtime = runtime();
        let result = runtime.start().await;

        assert!(matches!(
            result,
            Err(RuntimeError::NoSources { registered: 0 })
        ));
        assert!(!runtime.is_running().await);
    }

    #[tokio::test]
    async fn test_failed_source_is_skipped() {
        let runtime = runtime();
        let sink = Arc::new(RecordingSink::default());
        let (source, _tx) = ChannelSource::new(sink);
        let source = Arc::new(source);

        runtime.register_source(BrokenSource).await;
        runtime.register_source_boxed(source.clone()).await;
        assert_eq!(runtime.source_count().await, 2);

        runtime.start().await.unwrap();
        assert!(runtime.is_running().await);

        runtime.stop().await.unwrap();
        assert!(*source.shut_down.lock());
    }

    #[tokio::test]
    async fn test_only_broken_sources_fails() {
        let runtime = runtime();
        runtime.register_source(BrokenSource).await;

        let result = runtime.start().await;

        assert!(matches!(
            result,
            Err(RuntimeError::NoSources { registered: 1 })
        ));
    }

    #[test]
    fn test_stats_display() {
        let stats = RuntimeStats {
            dispatched: 5,
            handled: 2,
            ignored: 1,
            failed: 1,
        };
        assert_eq!(stats.in_flight(), 1);
        assert_eq!(
            stats.to_string(),
            "Messages: 5 dispatched (2 handled, 1 ignored, 1 failed)"
        );
    }
}
