//! # Herald Framework
//!
//! Parsing and routing of chat commands.
//!
//! This layer provides:
//! - A quote-aware tokenizer for command text ([`command::split`])
//! - Declarative command schemas with typed flags, aliases and defaults
//!   ([`CommandBuilder`], [`CommandSchema`])
//! - Schema-driven coercion of tokens into arguments and flags
//! - A [`Router`] that recognises addressed messages, looks up the command
//!   and runs its handler, turning every failure into a reply
//!
//! ```rust,ignore
//! use herald_framework::{CommandBuilder, CommandContext, Router, RouterConfig};
//!
//! let router = Router::new(RouterConfig::default());
//! router.add_command(
//!     "roll",
//!     CommandBuilder::new()
//!         .number("sides")
//!         .default("sides", 6)
//!         .count("v")
//!         .handler(|ctx: CommandContext| async move {
//!             format!("rolling a d{}", ctx.flags().number("sides").unwrap_or(6.0))
//!         })
//!         .build(),
//! );
//! ```

pub mod addressing;
pub mod command;
pub mod context;
pub mod error;
pub mod handler;
pub mod router;

pub use addressing::Addressing;
pub use command::{
    CommandBuilder, CommandSchema, FlagKind, FlagValue, Flags, IntoFlagNames, Invocation, Token,
    infer_value, tokenize,
};
pub use context::CommandContext;
pub use error::{CommandError, CommandResult, HandlerError};
pub use handler::{BoxedHandler, Handler, HandlerResponse, into_handler};
pub use router::{Delivery, DispatchOutcome, IgnoreReason, Router, RouterConfig};
