//! # Herald Core
//!
//! The transport boundary of the Herald command router.
//!
//! Herald itself only parses and routes text that has already been delivered.
//! Everything on the other side of that line is described here as a pair of
//! traits:
//!
//! - [`MessageSource`] delivers [`InboundMessage`]s to a [`MessageDispatcher`]
//!   registered by the runtime.
//! - [`MessageSink`] knows the bot's own identity and sends replies back.
//!
//! ```text
//! ┌───────────────┐  InboundMessage   ┌────────┐   reply()   ┌─────────────┐
//! │ MessageSource │──────────────────▶│ Router │────────────▶│ MessageSink │
//! └───────────────┘                   └────────┘             └─────────────┘
//! ```

pub mod error;
pub mod message;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use message::{InboundMessage, ReplyOptions};
pub use transport::{BoxedSink, BoxedSource, MessageDispatcher, MessageSink, MessageSource};
