//! Herald Runtime - orchestration layer for the Herald command router.
//!
//! This crate provides:
//! - Layered configuration loading with figment ([`config`])
//! - Logging setup on `tracing-subscriber` ([`logging`])
//! - The [`HeraldRuntime`], which starts message sources, routes every
//!   inbound message through a [`Router`](herald_framework::Router) and shuts
//!   down on Ctrl+C or SIGTERM
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HeraldRuntime::new();
//!     runtime.add_command("ping", ping_schema());
//!     runtime.register_source(MySource::new()).await;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingError;
pub use runtime::{HeraldRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
