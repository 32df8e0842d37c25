//! Record decoder for raw input lines.
//!
//! A line is structured when the text from its first `{` onward parses as a JSON
//! object. Anything before that brace (a syslog header, a timestamp prefix) is
//! ignored. Lines with no brace at all are plain text.

use crate::model::Record;

/// Outcome of decoding one raw line.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeResult {
    /// The embedded JSON object.
    Structured(Record),
    /// No `{` anywhere in the line.
    PlainText,
    /// A `{` was found but the payload is not a valid JSON object.
    Malformed {
        /// The full raw line.
        raw: String,
        /// The parser's error text.
        error: String,
    },
}

/// Decode one raw line (without its trailing newline).
pub fn decode(raw: &str) -> DecodeResult {
    let Some(start) = raw.find('{') else {
        return DecodeResult::PlainText;
    };

    match serde_json::from_str::<Record>(&raw[start..]) {
        Ok(record) => DecodeResult::Structured(record),
        Err(e) => DecodeResult::Malformed {
            raw: raw.to_string(),
            error: e.to_string(),
        },
    }
}
