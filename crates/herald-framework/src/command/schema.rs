//! Declarative command schemas.
//!
//! A [`CommandBuilder`] accumulates flag declarations in any order and is
//! consumed by [`CommandBuilder::build`], producing a frozen
//! [`CommandSchema`] that can be shared across concurrent invocations.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use super::coerce::coerce;
use super::split::tokenize;
use super::value::{FlagValue, Flags};
use crate::error::CommandResult;
use crate::handler::{BoxedHandler, Handler, into_handler};

/// The type a declared flag is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// A single number; non-numeric input is dropped.
    Number,
    /// A single string.
    String,
    /// `true` when present.
    Boolean,
    /// Every occurrence, collected into a list.
    Array,
    /// The number of occurrences.
    Count,
}

impl FlagKind {
    /// Returns `true` if the flag reads a value from `=value` or the next token.
    pub fn takes_value(self) -> bool {
        matches!(self, Self::Number | Self::String | Self::Array)
    }
}

/// Conversion into one or more flag names.
///
/// Lets [`CommandBuilder::array`], [`CommandBuilder::count`] and
/// [`CommandBuilder::alias`] take either a single name or a list.
pub trait IntoFlagNames {
    fn into_flag_names(self) -> Vec<String>;
}

impl IntoFlagNames for &str {
    fn into_flag_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFlagNames for String {
    fn into_flag_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> IntoFlagNames for [&str; N] {
    fn into_flag_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoFlagNames for &[&str] {
    fn into_flag_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoFlagNames for Vec<String> {
    fn into_flag_names(self) -> Vec<String> {
        self
    }
}

/// Mutable builder for a [`CommandSchema`].
///
/// Every method takes and returns the builder, so configuration chains in any
/// order. Repeating a declaration for the same flag replaces the earlier one.
///
/// # Example
///
/// ```rust,ignore
/// let schema = CommandBuilder::new()
///     .number("count")
///     .default("count", 1)
///     .alias("verbose", ["v", "loud"])
///     .boolean("verbose")
///     .handler(|ctx: CommandContext| async move { "done" })
///     .build();
/// ```
#[derive(Clone, Default)]
pub struct CommandBuilder {
    /// alias name -> canonical name
    aliases: BTreeMap<String, String>,
    defaults: BTreeMap<String, FlagValue>,
    kinds: BTreeMap<String, FlagKind>,
    handler: Option<BoxedHandler>,
}

impl CommandBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the value `flag` takes when absent from the input.
    pub fn default(mut self, flag: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.defaults.insert(flag.into(), value.into());
        self
    }

    /// Declares a number flag.
    pub fn number(self, flag: impl Into<String>) -> Self {
        self.declare(vec![flag.into()], FlagKind::Number)
    }

    /// Declares a string flag.
    pub fn string(self, flag: impl Into<String>) -> Self {
        self.declare(vec![flag.into()], FlagKind::String)
    }

    /// Declares a boolean flag.
    pub fn boolean(self, flag: impl Into<String>) -> Self {
        self.declare(vec![flag.into()], FlagKind::Boolean)
    }

    /// Declares one or more array flags.
    pub fn array(self, flags: impl IntoFlagNames) -> Self {
        self.declare(flags.into_flag_names(), FlagKind::Array)
    }

    /// Declares one or more count flags.
    pub fn count(self, flags: impl IntoFlagNames) -> Self {
        self.declare(flags.into_flag_names(), FlagKind::Count)
    }

    /// Sets the aliases of `canonical`, replacing any it had before.
    ///
    /// An alias already owned by another flag moves to `canonical`.
    pub fn alias(mut self, canonical: impl Into<String>, aliases: impl IntoFlagNames) -> Self {
        let canonical = canonical.into();
        self.aliases.retain(|_, owner| *owner != canonical);
        for alias in aliases.into_flag_names() {
            if alias != canonical {
                self.aliases.insert(alias, canonical.clone());
            }
        }
        self
    }

    /// Sets the handler run when the command is dispatched.
    pub fn handler<H, R>(mut self, handler: H) -> Self
    where
        H: Handler<R>,
        R: 'static,
    {
        self.handler = Some(into_handler(handler));
        self
    }

    /// Sets a pre-built boxed handler.
    pub fn handler_boxed(mut self, handler: BoxedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    fn declare(mut self, flags: Vec<String>, kind: FlagKind) -> Self {
        for flag in flags {
            self.kinds.insert(flag, kind);
        }
        self
    }

    /// Freezes the builder.
    ///
    /// Kinds and defaults declared under an alias name move to the canonical
    /// name unless the canonical name has its own.
    pub fn build(self) -> CommandSchema {
        let Self {
            aliases,
            defaults,
            kinds,
            handler,
        } = self;

        let canonical = |name: String| aliases.get(&name).cloned().unwrap_or(name);

        let mut resolved_kinds = BTreeMap::new();
        let (direct, aliased): (Vec<_>, Vec<_>) =
            kinds.into_iter().partition(|(name, _)| !aliases.contains_key(name));
        for (name, kind) in direct.into_iter().chain(aliased) {
            resolved_kinds.entry(canonical(name)).or_insert(kind);
        }

        let mut resolved_defaults = BTreeMap::new();
        let (direct, aliased): (Vec<_>, Vec<_>) =
            defaults.into_iter().partition(|(name, _)| !aliases.contains_key(name));
        for (name, value) in direct.into_iter().chain(aliased) {
            resolved_defaults.entry(canonical(name)).or_insert(value);
        }

        trace!(
            flags = resolved_kinds.len(),
            aliases = aliases.len(),
            defaults = resolved_defaults.len(),
            has_handler = handler.is_some(),
            "Command schema built"
        );

        CommandSchema {
            aliases,
            defaults: resolved_defaults,
            kinds: resolved_kinds,
            handler,
        }
    }
}

impl fmt::Debug for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("aliases", &self.aliases)
            .field("defaults", &self.defaults)
            .field("kinds", &self.kinds)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// A frozen description of a command's flags and its handler.
///
/// Immutable once built; share it behind an `Arc` for concurrent use.
#[derive(Clone)]
pub struct CommandSchema {
    aliases: BTreeMap<String, String>,
    defaults: BTreeMap<String, FlagValue>,
    kinds: BTreeMap<String, FlagKind>,
    handler: Option<BoxedHandler>,
}

impl CommandSchema {
    /// Starts a new [`CommandBuilder`].
    pub fn builder() -> CommandBuilder {
        CommandBuilder::new()
    }

    /// Resolves an alias to its canonical name; other names map to themselves.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Returns the declared kind of a canonical flag.
    pub fn kind(&self, flag: &str) -> Option<FlagKind> {
        self.kinds.get(flag).copied()
    }

    /// Returns the default of a canonical flag.
    pub fn default_value(&self, flag: &str) -> Option<&FlagValue> {
        self.defaults.get(flag)
    }

    /// Iterates over the aliases of `canonical`.
    pub fn aliases_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, owner)| owner.as_str() == canonical)
            .map(|(alias, _)| alias.as_str())
    }

    /// Iterates over declared flags and their kinds.
    pub fn declared(&self) -> impl Iterator<Item = (&str, FlagKind)> {
        self.kinds.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Iterates over flags that have a default.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.defaults.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the handler, if one was set.
    pub fn handler(&self) -> Option<&BoxedHandler> {
        self.handler.as_ref()
    }

    /// Tokenizes `input` and coerces it against this schema.
    ///
    /// `input` is the text after the command name.
    pub fn parse(&self, input: &str) -> CommandResult<(Vec<String>, Flags)> {
        let tokens = tokenize(input)?;
        Ok(coerce(self, &tokens))
    }
}

impl fmt::Debug for CommandSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSchema")
            .field("aliases", &self.aliases)
            .field("defaults", &self.defaults)
            .field("kinds", &self.kinds)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
