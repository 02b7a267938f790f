//! Record encoders.
//!
//! A record is an ordered slice of `(key, value)` pairs. Each encoder turns one
//! record into one newline-terminated line of bytes.
//!
//! logfmt keys are never dropped: characters that would need quoting are
//! replaced with `_` and an empty key is written as `_`, so every field of a
//! record survives encoding.

use serde_json::{Map, Value};

use crate::error::LoggingError;
use crate::options::LogFormat;

/// Encodes records in a single wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    Logfmt,
    Json,
}

impl From<LogFormat> for Encoder {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Logfmt => Self::Logfmt,
            LogFormat::Json => Self::Json,
        }
    }
}

impl Encoder {
    /// Encodes one record, including the trailing newline.
    ///
    /// # Errors
    /// Returns [`LoggingError::Encode`] if a JSON value cannot be serialized.
    pub fn encode(self, fields: &[(&str, Value)]) -> Result<Vec<u8>, LoggingError> {
        match self {
            Self::Logfmt => Ok(encode_logfmt(fields)),
            Self::Json => encode_json(fields),
        }
    }
}

fn encode_json(fields: &[(&str, Value)]) -> Result<Vec<u8>, LoggingError> {
    let mut object = Map::with_capacity(fields.len());
    for (key, value) in fields {
        object.insert((*key).to_owned(), value.clone());
    }

    let mut buf = serde_json::to_vec(&Value::Object(object))?;
    buf.push(b'\n');
    Ok(buf)
}

fn encode_logfmt(fields: &[(&str, Value)]) -> Vec<u8> {
    let mut line = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        push_key(&mut line, key);
        line.push('=');
        match value {
            Value::String(s) => push_text(&mut line, s),
            Value::Null | Value::Bool(_) | Value::Number(_) => line.push_str(&value.to_string()),
            Value::Array(_) | Value::Object(_) => push_text(&mut line, &value.to_string()),
        }
    }
    line.push('\n');
    line.into_bytes()
}

fn push_key(line: &mut String, key: &str) {
    if key.is_empty() {
        line.push('_');
        return;
    }
    line.extend(
        key.chars()
            .map(|c| if needs_quoting(c) { '_' } else { c }),
    );
}

fn push_text(line: &mut String, text: &str) {
    if text.is_empty() || text.chars().any(needs_quoting) {
        // JSON string escaping matches logfmt quoting rules.
        line.push_str(&Value::String(text.to_owned()).to_string());
    } else {
        line.push_str(text);
    }
}

fn needs_quoting(c: char) -> bool {
    c <= ' ' || c == '=' || c == '"' || c.is_control()
}
