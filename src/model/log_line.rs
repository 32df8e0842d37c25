//! Classified log lines.
//!
//! A [`LogLine`] is produced once by the classifier and never changes afterwards.
//! It is appended to exactly one group and shared read-only (behind `Arc`) with
//! every snapshot that covers it.

use chrono::{DateTime, Utc};

/// One decoded structured input line: string keys to dynamically-typed JSON values.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ===== Tag =====

/// A rendered key or key/value annotation attached to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    value: Option<String>,
}

impl Tag {
    /// A key-only ("solo") tag.
    pub fn solo(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A key/value tag.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Rendered tag name. Unique within one line's tag list.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered tag value, if the tag rule has one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

// ===== LogLine =====

/// A classified log line.
/// Invariant: immutable after construction; tag names are pairwise distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    level: String,
    timestamp: DateTime<Utc>,
    message: String,
    data: Record,
    tags: Vec<Tag>,
}

impl LogLine {
    /// Create a new line.
    ///
    /// Tags sharing a name with an earlier tag are dropped so the first
    /// occurrence wins, regardless of what the caller passed in.
    pub fn new(
        level: impl Into<String>,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
        data: Record,
        tags: Vec<Tag>,
    ) -> Self {
        let mut unique: Vec<Tag> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.iter().any(|t| t.name == tag.name) {
                unique.push(tag);
            }
        }

        Self {
            level: level.into(),
            timestamp,
            message: message.into(),
            data,
            tags: unique,
        }
    }

    /// A line carrying only a message, used for plain-text and malformed input.
    pub fn bare(level: impl Into<String>, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(level, timestamp, message, Record::new(), Vec::new())
    }

    // ===== Accessors (read-only) =====

    /// Rendered level, `unknown` if the level rule failed.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Parsed timestamp, or the arrival time when the record had none.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The decoded record. Empty for plain-text and malformed lines.
    pub fn data(&self) -> &Record {
        &self.data
    }

    /// Tags in rule order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn make_timestamp() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn new_keeps_first_tag_per_name() {
        let line = LogLine::new(
            "info",
            make_timestamp(),
            "hello",
            Record::new(),
            vec![
                Tag::with_value("env", "prod"),
                Tag::solo("slow"),
                Tag::with_value("env", "staging"),
            ],
        );

        assert_eq!(line.tags().len(), 2);
        assert_eq!(line.tags()[0], Tag::with_value("env", "prod"));
        assert_eq!(line.tags()[1], Tag::solo("slow"));
    }

    #[test]
    fn bare_line_has_no_data_or_tags() {
        let line = LogLine::bare("", make_timestamp(), "plain text");
        assert_eq!(line.message(), "plain text");
        assert!(line.data().is_empty());
        assert!(line.tags().is_empty());
    }

    #[test]
    fn solo_tag_has_no_value() {
        let tag = Tag::solo("slow");
        assert_eq!(tag.name(), "slow");
        assert_eq!(tag.value(), None);
    }
}
