//! Flag values and the parsed flag mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The value of a single flag.
///
/// Lists hold numbers and strings for declared array flags; a repeated
/// undeclared flag may also collect booleans.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Number(f64),
    Boolean(bool),
    String(String),
    List(Vec<FlagValue>),
}

impl FlagValue {
    /// Returns the number, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[FlagValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<f64> for FlagValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FlagValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for FlagValue {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for FlagValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<&str> for FlagValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<FlagValue>> From<Vec<T>> for FlagValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Infers the type of an undeclared flag's textual value.
///
/// Precedence: `true` / `false` literal, then numeric literal, then string.
pub fn infer_value(text: &str) -> FlagValue {
    match text {
        "true" => FlagValue::Boolean(true),
        "false" => FlagValue::Boolean(false),
        _ => parse_number(text).map_or_else(|| FlagValue::String(text.to_string()), FlagValue::Number),
    }
}

/// Parses `text` as a decimal or float literal.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent. Rejects everything else, including `inf`, `NaN` and empty input.
pub fn parse_number(text: &str) -> Option<f64> {
    if !is_numeric_literal(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Element coercion for array flags: numbers when purely numeric, else strings.
pub(crate) fn array_element(text: &str) -> FlagValue {
    parse_number(text).map_or_else(|| FlagValue::String(text.to_string()), FlagValue::Number)
}

fn is_numeric_literal(text: &str) -> bool {
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };

    let has_digits = !int.is_empty() || frac.is_some_and(|f| !f.is_empty());
    let mantissa_ok = has_digits && digits(int) && frac.is_none_or(digits);
    let exponent_ok = exponent.is_none_or(|e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && digits(e)
    });

    mantissa_ok && exponent_ok
}

/// Parsed flags keyed by canonical flag name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Flags(BTreeMap<String, FlagValue>);

impl Flags {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value of `name`.
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    /// Returns `true` if `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns `name` as a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FlagValue::as_number)
    }

    /// Returns `name` as a boolean; absent or non-boolean flags read as `false`.
    pub fn boolean(&self, name: &str) -> bool {
        self.get(name).and_then(FlagValue::as_bool).unwrap_or(false)
    }

    /// Returns `name` as a string.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FlagValue::as_str)
    }

    /// Returns `name` as a list; absent flags read as empty.
    pub fn list(&self, name: &str) -> &[FlagValue] {
        self.get(name).and_then(FlagValue::as_list).unwrap_or(&[])
    }

    /// Returns a count flag's tally; absent flags read as zero.
    pub fn count(&self, name: &str) -> u64 {
        self.number(name).map_or(0, |n| n.max(0.0) as u64)
    }

    /// Number of flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: FlagValue) {
        self.0.insert(name.into(), value);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FlagValue> {
        self.0.get_mut(name)
    }
}

impl FromIterator<(String, FlagValue)> for Flags {
    fn from_iter<I: IntoIterator<Item = (String, FlagValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
