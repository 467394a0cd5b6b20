//! Command parsing.
//!
//! A command's text goes through two pure stages:
//!
//! 1. [`split`] turns the raw text into [`Token`]s, keeping quoted phrases
//!    together and recognising `--long`, `-s` and `--` forms.
//! 2. [`coerce`] applies a frozen [`CommandSchema`] to the tokens, producing
//!    positional arguments and a [`Flags`] mapping keyed by canonical names.
//!
//! Schemas are described with a [`CommandBuilder`]:
//!
//! ```rust,ignore
//! let schema = CommandBuilder::new()
//!     .number("count")
//!     .array("tag")
//!     .count("v")
//!     .alias("verbose", "V")
//!     .boolean("verbose")
//!     .build();
//!
//! let (args, flags) = schema.parse("note.txt --count 3 --tag a --tag b -vvv")?;
//! assert_eq!(args, ["note.txt"]);
//! assert_eq!(flags.number("count"), Some(3.0));
//! ```

pub mod coerce;
pub mod invocation;
pub mod schema;
pub mod split;
pub mod value;

pub use coerce::coerce;
pub use invocation::Invocation;
pub use schema::{CommandBuilder, CommandSchema, FlagKind, IntoFlagNames};
pub use split::{Token, Word, shell_split, strip_matching_quotes, tokenize};
pub use value::{FlagValue, Flags, infer_value, parse_number};
