//! Command parsing: turns extracted protocol lines into structured commands.
//!
//! Each protocol line is `<anything>/<json>` where the JSON payload is an
//! object with a `kind` field from the closed operation set and an
//! `operands` array of primitives. One bad line never aborts the stream:
//! parsing yields a per-line `Result` and the caller decides what to do
//! with the failures.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::RawLine;

/// The closed set of structural operations a program may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Add a key to the structure.
    Insert,
    /// Remove a key from the structure.
    Delete,
    /// Look a key up without mutating.
    Search,
    /// Walk the whole structure in a named order.
    Traverse,
}

impl CommandKind {
    /// Wire name of this kind, as it appears in payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Traverse => "traverse",
        }
    }

    fn from_wire(name: &str) -> Option<Self> {
        match name {
            "insert" => Some(Self::Insert),
            "delete" => Some(Self::Delete),
            "search" => Some(Self::Search),
            "traverse" => Some(Self::Traverse),
            _ => None,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive payload value. Payload operands may only be JSON scalars;
/// nested arrays and objects are rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// Integer value (keys).
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value (traversal orders and the like).
    Text(String),
    /// Boolean flag.
    Flag(bool),
}

impl Operand {
    /// Interpret this operand as an integer key.
    ///
    /// Floats with a zero fractional part are accepted because several of
    /// the instrumented runtimes print all numbers as floats.
    #[must_use]
    pub fn as_key(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v) if v.fract() == 0.0 && v.abs() < 9e15 => Some(*v as i64),
            _ => None,
        }
    }

    /// Interpret this operand as a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Flag(v) => write!(f, "{v}"),
        }
    }
}

/// One structural operation decoded from a protocol line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Which operation to apply.
    pub kind: CommandKind,
    /// Ordered operation arguments.
    pub operands: Vec<Operand>,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Why a single protocol line failed to parse. Carried as a value in the
/// stream, never raised past the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line has no `/` separator, so there is no payload to decode.
    #[error("no `/` separator in instrumentation line `{line}`")]
    MissingSeparator {
        /// The offending token-stripped line.
        line: String,
    },
    /// The payload after the separator is not a well-formed command object.
    #[error("malformed payload in instrumentation line `{line}`: {detail}")]
    MalformedPayload {
        /// The offending token-stripped line.
        line: String,
        /// What exactly was wrong with the payload.
        detail: String,
    },
    /// The payload decoded but names an operation outside the closed set.
    #[error("unknown command kind `{kind}` in instrumentation line `{line}`")]
    UnknownKind {
        /// The offending token-stripped line.
        line: String,
        /// The unrecognized `kind` value.
        kind: String,
    },
}

impl ParseError {
    /// Stable reason code for diagnostics and logging.
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::MissingSeparator { .. } => "missing-separator",
            Self::MalformedPayload { .. } => "malformed-payload",
            Self::UnknownKind { .. } => "unknown-kind",
        }
    }

    /// The token-stripped line that failed.
    #[must_use]
    pub fn line(&self) -> &str {
        match self {
            Self::MissingSeparator { line }
            | Self::MalformedPayload { line, .. }
            | Self::UnknownKind { line, .. } => line,
        }
    }
}

/// Ordered parse results for a whole run, in raw-line order.
///
/// Both successes and failures are retained so diagnostics keep their
/// position relative to the commands around them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandStream {
    entries: Vec<Result<Command, ParseError>>,
}

impl CommandStream {
    /// All results in order of appearance.
    #[must_use]
    pub fn entries(&self) -> &[Result<Command, ParseError>] {
        &self.entries
    }

    /// Only the commands that parsed, in order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    /// Only the per-line failures, in order.
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    /// Total number of protocol lines, valid or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the run produced no protocol lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Result<Command, ParseError>> for CommandStream {
    fn from_iter<I: IntoIterator<Item = Result<Command, ParseError>>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Parse one protocol line into a [`Command`].
///
/// # Errors
///
/// Returns [`ParseError`] when the separator is missing, the payload is not
/// a JSON object of the expected shape, or the `kind` is not in the closed
/// operation set.
pub fn parse(line: &RawLine) -> Result<Command, ParseError> {
    // Commands sit after the divider; anything before it is runtime noise.
    let Some((_, payload)) = line.as_str().split_once('/') else {
        return Err(ParseError::MissingSeparator { line: line.as_str().to_owned() });
    };

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| malformed(line, format!("invalid JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(malformed(line, "payload is not an object".to_owned()));
    };

    let kind_name = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(line, "missing string field `kind`".to_owned()))?;

    let kind = CommandKind::from_wire(kind_name).ok_or_else(|| ParseError::UnknownKind {
        line: line.as_str().to_owned(),
        kind: kind_name.to_owned(),
    })?;

    let raw_operands = object
        .get("operands")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(line, "missing array field `operands`".to_owned()))?;

    let operands = raw_operands
        .iter()
        .map(|v| scalar_operand(v).ok_or_else(|| malformed(line, format!("non-primitive operand {v}"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command { kind, operands })
}

/// Parse every extracted line, preserving order and keeping failures inline.
#[must_use]
pub fn parse_all(lines: &[RawLine]) -> CommandStream {
    lines.iter().map(parse).collect()
}

fn malformed(line: &RawLine, detail: String) -> ParseError {
    ParseError::MalformedPayload { line: line.as_str().to_owned(), detail }
}

fn scalar_operand(value: &Value) -> Option<Operand> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Operand::Int(i))
            } else {
                n.as_f64().map(Operand::Float)
            }
        }
        Value::String(s) => Some(Operand::Text(s.clone())),
        Value::Bool(b) => Some(Operand::Flag(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
