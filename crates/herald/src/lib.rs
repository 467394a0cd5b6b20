//! # Herald
//!
//! A command router for chat bots.
//!
//! ## Overview
//!
//! Herald turns chat messages addressed to a bot into typed command
//! invocations. A message is addressed when it starts with a mention of the
//! bot or with the configured prefix (`$>` by default). The text after the
//! command name is split into quote-aware tokens and coerced against the
//! command's declared flags before its handler runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────┐     ┌────────────────────────────────┐
//! │ MessageSource │────▶│ Runtime │────▶│ Router (own task per message)  │──▶ handler
//! │  (transport)  │     │         │     │ addressing → lookup → parse    │
//! └───────────────┘     └─────────┘     └────────────────────────────────┘
//!         ▲                                             │
//!         └───────────── MessageSink::reply ◀───────────┘
//! ```
//!
//! - **Core**: the transport contract (`MessageSource`, `MessageSink`)
//! - **Framework**: tokenizer, schemas, coercion and the `Router`
//! - **Runtime**: configuration, logging and source lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! async fn sum(ctx: CommandContext) -> Result<String, String> {
//!     let total: f64 = ctx
//!         .args()
//!         .iter()
//!         .map(|a| a.parse::<f64>().map_err(|_| format!("`{a}` is not a number")))
//!         .sum::<Result<_, _>>()?;
//!     Ok(total.to_string())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HeraldRuntime::new();
//!     runtime.add_command("sum", CommandBuilder::new().handler(sum).build());
//!     runtime.register_source(MySource::new()).await;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, HeraldRuntime, RuntimeStats};

    // Commands and handlers
    pub use herald_framework::{
        CommandBuilder, CommandContext, CommandError, CommandSchema, FlagKind, FlagValue, Flags,
        HandlerError, HandlerResponse,
    };

    // Routing
    pub use herald_framework::{DispatchOutcome, IgnoreReason, Router, RouterConfig};

    // Transport contract
    pub use herald_core::{
        BoxedSink, InboundMessage, MessageDispatcher, MessageSink, MessageSource, ReplyOptions,
        TransportError, TransportResult,
    };
}
