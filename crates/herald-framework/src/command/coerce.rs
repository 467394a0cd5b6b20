//! Schema-driven coercion of tokens into arguments and flags.

use tracing::trace;

use super::schema::{CommandSchema, FlagKind};
use super::split::{Token, strip_matching_quotes};
use super::value::{FlagValue, Flags, array_element, infer_value, parse_number};

/// Applies `schema` to `tokens`.
///
/// Returns the positional arguments in input order and the flags keyed by
/// canonical name. Pure: the same tokens against the same schema always
/// produce the same result.
pub fn coerce(schema: &CommandSchema, tokens: &[Token]) -> (Vec<String>, Flags) {
    let mut coercion = Coercion {
        schema,
        args: Vec::new(),
        flags: Flags::new(),
    };
    let mut index = 0;
    let mut positional_only = false;

    while let Some(token) = tokens.get(index) {
        index += 1;

        if positional_only {
            coercion.positional(token);
            continue;
        }

        let consumed_next = match token {
            Token::Separator => {
                positional_only = true;
                false
            }
            Token::Word(_) | Token::Quoted(_) => {
                coercion.positional(token);
                false
            }
            Token::Long { name, value } => coercion.flag(name, value.as_deref(), tokens.get(index)),
            Token::Short { flags, value } => {
                coercion.short_cluster(flags, value.as_deref(), tokens.get(index))
            }
        };

        if consumed_next {
            index += 1;
        }
    }

    coercion.finish()
}

struct Coercion<'a> {
    schema: &'a CommandSchema,
    args: Vec<String>,
    flags: Flags,
}

impl Coercion<'_> {
    /// A quoted token already lost its one layer of quotes in the tokenizer.
    fn positional(&mut self, token: &Token) {
        let arg = match token {
            Token::Quoted(text) => text.clone(),
            Token::Word(text) => strip_matching_quotes(text).to_string(),
            other => other.to_string(),
        };
        self.args.push(arg);
    }

    /// `-abc`: every character is a flag; only the last may read the next token.
    /// A value-taking flag before the end swallows the rest of the cluster
    /// (`-n3`).
    fn short_cluster(&mut self, cluster: &str, attached: Option<&str>, next: Option<&Token>) -> bool {
        for (at, ch) in cluster.char_indices() {
            let end = at + ch.len_utf8();
            let name = &cluster[at..end];
            let rest = &cluster[end..];

            if rest.is_empty() {
                return self.flag(name, attached, next);
            }

            let takes_value = self
                .schema
                .kind(self.schema.canonical(name))
                .is_some_and(FlagKind::takes_value);
            if takes_value {
                let value = match attached {
                    Some(attached) => format!("{rest}={attached}"),
                    None => rest.to_string(),
                };
                self.flag(name, Some(&value), None);
                return false;
            }

            self.flag(name, None, None);
        }
        false
    }

    /// Records one flag occurrence. Returns `true` if `next` was consumed as
    /// its value.
    fn flag(&mut self, raw: &str, attached: Option<&str>, next: Option<&Token>) -> bool {
        let schema = self.schema;
        let name = schema.canonical(raw).to_string();
        let kind = schema.kind(&name);

        if kind.is_none()
            && attached.is_none()
            && let Some(negated) = raw
                .strip_prefix("no-")
                .map(|base| schema.canonical(base))
                .filter(|base| schema.kind(base) == Some(FlagKind::Boolean))
        {
            self.flags.insert(negated, FlagValue::Boolean(false));
            return false;
        }

        let next_value = next.and_then(Token::as_value);

        match kind {
            Some(FlagKind::Boolean) => {
                let value = attached.is_none_or(|v| v != "false");
                self.flags.insert(name, FlagValue::Boolean(value));
                false
            }
            Some(FlagKind::Count) => {
                let tally = self.flags.number(&name).unwrap_or(0.0) + 1.0;
                self.flags.insert(name, FlagValue::Number(tally));
                false
            }
            Some(FlagKind::Number) => {
                // A following word is only taken when it is numeric.
                let (text, consumed) = match attached {
                    Some(text) => (Some(text), false),
                    None => match next_value.filter(|v| parse_number(v).is_some()) {
                        Some(text) => (Some(text), true),
                        None => (None, false),
                    },
                };
                match text.and_then(parse_number) {
                    Some(n) => self.flags.insert(name, FlagValue::Number(n)),
                    None => {
                        trace!(flag = %name, value = ?text, "Dropping non-numeric value");
                    }
                }
                consumed
            }
            Some(FlagKind::String) => {
                let (text, consumed) = take_value(attached, next_value);
                self.flags
                    .insert(name, FlagValue::String(text.unwrap_or_default().to_string()));
                consumed
            }
            Some(FlagKind::Array) => {
                let (text, consumed) = take_value(attached, next_value);
                let element = text.map(array_element);
                match self.flags.get_mut(&name) {
                    Some(FlagValue::List(items)) => items.extend(element),
                    _ => self
                        .flags
                        .insert(name, FlagValue::List(element.into_iter().collect())),
                }
                consumed
            }
            None => {
                let (text, consumed) = take_value(attached, next_value);
                let value = text.map_or(FlagValue::Boolean(true), infer_value);
                match self.flags.get_mut(&name) {
                    Some(FlagValue::List(items)) => items.push(value),
                    Some(existing) => {
                        let first = std::mem::replace(existing, FlagValue::Boolean(false));
                        *existing = FlagValue::List(vec![first, value]);
                    }
                    None => self.flags.insert(name, value),
                }
                consumed
            }
        }
    }

    fn finish(mut self) -> (Vec<String>, Flags) {
        for (flag, value) in self.schema.defaults() {
            if !self.flags.contains(flag) {
                self.flags.insert(flag, value.clone());
            }
        }

        for (flag, kind) in self.schema.declared() {
            if self.flags.contains(flag) {
                continue;
            }
            let fallback = match kind {
                FlagKind::Boolean => FlagValue::Boolean(false),
                FlagKind::Count => FlagValue::Number(0.0),
                FlagKind::Array => FlagValue::List(Vec::new()),
                FlagKind::Number | FlagKind::String => continue,
            };
            self.flags.insert(flag, fallback);
        }

        (self.args, self.flags)
    }
}

fn take_value<'t>(attached: Option<&'t str>, next: Option<&'t str>) -> (Option<&'t str>, bool) {
    match (attached, next) {
        (Some(text), _) => (Some(text), false),
        (None, Some(text)) => (Some(text), true),
        (None, None) => (None, false),
    }
}
