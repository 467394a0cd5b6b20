use std::fmt;

use crate::error::{CommandError, CommandResult};

/// A whitespace-delimited word with its quoting removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word text with quote characters and escapes resolved.
    pub text: String,
    /// Whether the word began with a quote character.
    pub quoted: bool,
}

/// One lexical unit of command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word.
    Word(String),
    /// A word that started with a quote; always positional.
    Quoted(String),
    /// `--name` or `--name=value`.
    Long {
        name: String,
        value: Option<String>,
    },
    /// `-abc` or `-n=value`; every character is one flag.
    Short {
        flags: String,
        value: Option<String>,
    },
    /// A bare `--`; everything after it is positional.
    Separator,
}

impl Token {
    /// Returns the text of a token that can serve as a flag value.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Word(text) | Self::Quoted(text) => Some(text),
            _ => None,
        }
    }

    fn classify(word: Word) -> Self {
        if word.quoted {
            return Self::Quoted(word.text);
        }
        if word.text == "--" {
            return Self::Separator;
        }
        if let Some(rest) = word.text.strip_prefix("--") {
            let (name, value) = split_attached(rest);
            if !name.is_empty() {
                return Self::Long { name, value };
            }
        } else if let Some(rest) = word.text.strip_prefix('-')
            && !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        {
            let (flags, value) = split_attached(rest);
            if !flags.is_empty() {
                return Self::Short { flags, value };
            }
        }
        Self::Word(word.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(text) | Self::Quoted(text) => f.write_str(text),
            Self::Long { name, value: None } => write!(f, "--{name}"),
            Self::Long {
                name,
                value: Some(value),
            } => write!(f, "--{name}={value}"),
            Self::Short { flags, value: None } => write!(f, "-{flags}"),
            Self::Short {
                flags,
                value: Some(value),
            } => write!(f, "-{flags}={value}"),
            Self::Separator => f.write_str("--"),
        }
    }
}

fn split_attached(rest: &str) -> (String, Option<String>) {
    match rest.split_once('=') {
        Some((name, value)) => (name.to_string(), Some(value.to_string())),
        None => (rest.to_string(), None),
    }
}

/// Shell-like splitting of command text into words.
///
/// Handles:
/// - Whitespace-separated words
/// - Quoted strings (single and double quotes) that open a word
/// - Quoted flag values directly after `=` (`--title="two words"`)
/// - Escape sequences within double quotes
///
/// A quote character anywhere else is literal, so `don't` is one word.
/// An unterminated quote is reported as [`CommandError::MalformedInput`].
pub fn shell_split(input: &str) -> CommandResult<Vec<Word>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut quote: Option<(char, usize)> = None;
    let mut escape_next = false;

    for (column, ch) in input.chars().enumerate() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match quote {
            Some(('"', _)) if ch == '\\' => escape_next = true,
            Some((open, _)) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if (ch == '\'' || ch == '"') && (!in_word || opens_flag_value(&current)) => {
                if !in_word {
                    in_word = true;
                    quoted = true;
                }
                quote = Some((ch, column));
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(Word {
                        text: std::mem::take(&mut current),
                        quoted,
                    });
                    in_word = false;
                    quoted = false;
                }
            }
            None => {
                in_word = true;
                current.push(ch);
            }
        }
    }

    if let Some((open, column)) = quote {
        let kind = if open == '"' { "double" } else { "single" };
        return Err(CommandError::malformed(format!(
            "unterminated {kind} quote opened at column {}",
            column + 1
        )));
    }

    if in_word {
        words.push(Word {
            text: current,
            quoted,
        });
    }

    Ok(words)
}

/// `--name=` or `-n=` with nothing after the `=` yet.
fn opens_flag_value(current: &str) -> bool {
    current.starts_with('-') && current.ends_with('=') && current.matches('=').count() == 1
}

/// Splits and classifies command text into [`Token`]s.
pub fn tokenize(input: &str) -> CommandResult<Vec<Token>> {
    Ok(shell_split(input)?.into_iter().map(Token::classify).collect())
}

/// Removes one layer of matching `'…'` or `"…"` around `text`.
pub fn strip_matching_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if text.len() >= 2
            && let Some(inner) = text
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
