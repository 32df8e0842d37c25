//! Per-line classification.
//!
//! Turns one decoded record into a [`LogLine`] plus the group it belongs to. Every
//! sub-step degrades to a default when its rule fails, so classification of a
//! structured record always succeeds.

use crate::config::{GroupRule, Rules, TagRule};
use crate::model::{GroupKey, LogLine, Record, Tag};
use chrono::{DateTime, Utc};

/// Level given to lines whose level rule fails.
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Level given to malformed-JSON lines.
pub const MALFORMED_LEVEL: &str = "error";

/// Result of classifying one input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Group the line is appended to.
    pub key: GroupKey,
    /// Title used if this line creates the group.
    pub title: String,
    /// Description used if this line creates the group.
    pub description: String,
    /// Status text to show, if any status rule produced one.
    pub status: Option<String>,
    /// The classified line.
    pub line: LogLine,
}

/// Classify a structured record, using the current time as the fallback timestamp.
pub fn classify(record: Record, rules: &Rules) -> Classification {
    classify_at(record, rules, Utc::now())
}

/// Classify a structured record with an explicit fallback timestamp.
pub fn classify_at(record: Record, rules: &Rules, now: DateTime<Utc>) -> Classification {
    let group = resolve_group(&record, &rules.groups);
    let timestamp = resolve_timestamp(&record, rules, now);

    let level = rules
        .level
        .evaluate(&record)
        .unwrap_or_else(|_| UNKNOWN_LEVEL.to_string());

    let status = rules
        .statuses
        .iter()
        .find_map(|rule| non_empty(rule.display.evaluate(&record).ok()));

    let message = rules.message.evaluate(&record).unwrap_or_else(|e| {
        format!(
            "Field {} not found in data: {}",
            rules.message.source(),
            e
        )
    });

    let group_tags: &[TagRule] = match &group {
        Some((_, _, rule)) => &rule.tags,
        None => &[],
    };
    let tags = render_tags(&record, rules.tags.iter().chain(group_tags));

    let (key, title, description) = match group {
        Some((value, title, rule)) => (GroupKey::value(value), title, rule.name.clone()),
        None => reserved(GroupKey::Ungrouped),
    };

    Classification {
        key,
        title,
        description,
        status,
        line: LogLine::new(level, timestamp, message, record, tags),
    }
}

/// A line with no JSON payload at all.
pub fn plain_text(raw: &str, now: DateTime<Utc>) -> Classification {
    let (key, title, description) = reserved(GroupKey::PlainText);
    Classification {
        key,
        title,
        description,
        status: None,
        line: LogLine::bare("", now, raw),
    }
}

/// A line whose JSON payload failed to parse.
pub fn malformed(raw: &str, error: &str, now: DateTime<Utc>) -> Classification {
    let (key, title, description) = reserved(GroupKey::ParseFailures);
    Classification {
        key,
        title,
        description,
        status: None,
        line: LogLine::bare(
            MALFORMED_LEVEL,
            now,
            format!("Error loading '{raw}': {error}"),
        ),
    }
}

fn reserved(key: GroupKey) -> (GroupKey, String, String) {
    let title = key.reserved_title().unwrap_or_default().to_string();
    let description = key.reserved_description().unwrap_or_default().to_string();
    (key, title, description)
}

/// First rule whose value and title both render non-empty.
fn resolve_group<'r>(record: &Record, groups: &'r [GroupRule]) -> Option<(String, String, &'r GroupRule)> {
    groups.iter().find_map(|rule| {
        let value = non_empty(rule.value.evaluate(record).ok())?;
        let title = non_empty(rule.title.evaluate(record).ok())?;
        Some((value, title, rule))
    })
}

fn resolve_timestamp(record: &Record, rules: &Rules, now: DateTime<Utc>) -> DateTime<Utc> {
    non_empty(rules.timestamp.evaluate(record).ok())
        .and_then(|text| parse_wire_timestamp(&text))
        .unwrap_or(now)
}

/// `YYYY-MM-DDTHH:MM:SS[.f](Z|±hh:mm)`.
///
/// chrono's RFC 3339 parser also takes a space or `t` between date and time;
/// the wire format only allows `T`.
pub fn parse_wire_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if text.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Render tag rules in order. A tag whose name or (declared) value fails or
/// renders empty is skipped; the first tag per name wins.
fn render_tags<'r>(record: &Record, rules: impl Iterator<Item = &'r TagRule>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();

    for rule in rules {
        let Some(name) = non_empty(rule.key.evaluate(record).ok()) else {
            continue;
        };
        if tags.iter().any(|t| t.name() == name) {
            continue;
        }

        match &rule.value {
            None => tags.push(Tag::solo(name)),
            Some(value_rule) => {
                if let Some(value) = non_empty(value_rule.evaluate(record).ok()) {
                    tags.push(Tag::with_value(name, value));
                }
            }
        }
    }

    tags
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
