//! Declarative description of one configurable value.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::duration;

/// The default value of an option. The variant decides the type of the
/// command-line flag and how environment variables are parsed for its key.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    Int(i64),
    Int32(i32),
    Duration(Duration),
}

/// The kind of an [`OptionValue`], without the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    String,
    Int,
    Int32,
    Duration,
}

impl OptionValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            OptionValue::Bool(_) => ValueKind::Bool,
            OptionValue::String(_) => ValueKind::String,
            OptionValue::Int(_) => ValueKind::Int,
            OptionValue::Int32(_) => ValueKind::Int32,
            OptionValue::Duration(_) => ValueKind::Duration,
        }
    }

    /// The value as stored in the layered tree. Durations are kept in their
    /// string notation so they survive a write to any file format.
    pub(crate) fn to_tree(&self) -> Value {
        match self {
            OptionValue::Bool(b) => Value::Bool(*b),
            OptionValue::String(s) => Value::String(s.clone()),
            OptionValue::Int(i) => Value::from(*i),
            OptionValue::Int32(i) => Value::from(*i),
            OptionValue::Duration(d) => Value::String(duration::format(*d)),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::String(s) => write!(f, "{s}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Int32(i) => write!(f, "{i}"),
            OptionValue::Duration(d) => f.write_str(&duration::format(*d)),
        }
    }
}

impl ValueKind {
    /// Parse a raw string (env var, flag text) into a value of this kind.
    pub fn parse(self, raw: &str) -> Result<OptionValue, String> {
        match self {
            ValueKind::Bool => parse_bool(raw).map(OptionValue::Bool),
            ValueKind::String => Ok(OptionValue::String(raw.to_string())),
            ValueKind::Int => raw
                .trim()
                .parse()
                .map(OptionValue::Int)
                .map_err(|e| format!("expected an integer: {e}")),
            ValueKind::Int32 => raw
                .trim()
                .parse()
                .map(OptionValue::Int32)
                .map_err(|e| format!("expected a 32-bit integer: {e}")),
            ValueKind::Duration => duration::parse(raw.trim())
                .map(OptionValue::Duration)
                .map_err(|e| e.to_string()),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Ok(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Ok(false),
        _ => Err(format!("expected a boolean, got {raw:?}")),
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::String(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::String(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int32(v)
    }
}

impl From<Duration> for OptionValue {
    fn from(v: Duration) -> Self {
        OptionValue::Duration(v)
    }
}

/// One configurable value: its default, optional CLI flag, and the dotted key
/// it lands on in the target struct.
///
/// ```ignore
/// let port = ConfigOption::int(8080)
///     .flag("port")
///     .short('p')
///     .usage("port to listen on")
///     .key("server.port");
/// ```
///
/// An option without a key is flag-only: it is parsed and reported in
/// [`ParsedFlags`](crate::ParsedFlags) but never unmarshaled.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    pub flag_name: Option<String>,
    pub shorthand: Option<char>,
    pub value: OptionValue,
    pub usage: String,
    pub key: Option<String>,
}

impl ConfigOption {
    pub fn new(value: impl Into<OptionValue>) -> Self {
        Self {
            flag_name: None,
            shorthand: None,
            value: value.into(),
            usage: String::new(),
            key: None,
        }
    }

    pub fn bool(value: bool) -> Self {
        Self::new(OptionValue::Bool(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(OptionValue::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::new(OptionValue::Int(value))
    }

    pub fn int32(value: i32) -> Self {
        Self::new(OptionValue::Int32(value))
    }

    pub fn duration(value: Duration) -> Self {
        Self::new(OptionValue::Duration(value))
    }

    /// Expose the option as `--<name>`. An empty name means no flag.
    pub fn flag(mut self, name: &str) -> Self {
        self.flag_name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Single-character alias, `-<c>`. Only valid together with [`flag`](Self::flag).
    pub fn short(mut self, c: char) -> Self {
        self.shorthand = Some(c);
        self
    }

    pub fn usage(mut self, text: &str) -> Self {
        self.usage = text.to_string();
        self
    }

    /// Dotted path into the target struct, e.g. `"server.port"`. An empty key
    /// makes the option flag-only.
    pub fn key(mut self, key: &str) -> Self {
        self.key = (!key.is_empty()).then(|| key.to_string());
        self
    }
}
