//! Group identity.

use std::fmt;

/// Identity of a group in the index.
///
/// The three reserved groups are separate variants so that no rendered group
/// value (which can be any string a template produces) can ever collide with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    /// Lines whose structured payload failed to decode.
    ParseFailures,
    /// Lines with no structured payload at all.
    PlainText,
    /// Structured lines no group rule matched.
    Ungrouped,
    /// A value rendered by a group rule.
    Value(String),
}

impl GroupKey {
    /// Key for a rendered group value.
    pub fn value(value: impl Into<String>) -> Self {
        GroupKey::Value(value.into())
    }

    /// Default title for the reserved keys, `None` for rendered values.
    pub fn reserved_title(&self) -> Option<&'static str> {
        match self {
            GroupKey::ParseFailures => Some("Parse Failures"),
            GroupKey::PlainText => Some("Text"),
            GroupKey::Ungrouped => Some("No Group"),
            GroupKey::Value(_) => None,
        }
    }

    /// Default description for the reserved keys, `None` for rendered values.
    pub fn reserved_description(&self) -> Option<&'static str> {
        match self {
            GroupKey::ParseFailures => Some("Errors"),
            GroupKey::PlainText => Some("Not JSON"),
            GroupKey::Ungrouped => Some("Ungrouped"),
            GroupKey::Value(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::ParseFailures => f.write_str("<parse-failures>"),
            GroupKey::PlainText => f.write_str("<plain-text>"),
            GroupKey::Ungrouped => f.write_str("<ungrouped>"),
            GroupKey::Value(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_value_never_equals_reserved_key() {
        assert_ne!(GroupKey::value("Parse Failures"), GroupKey::ParseFailures);
        assert_ne!(GroupKey::value("<ungrouped>"), GroupKey::Ungrouped);
    }

    #[test]
    fn reserved_keys_have_titles() {
        assert_eq!(GroupKey::ParseFailures.reserved_title(), Some("Parse Failures"));
        assert_eq!(GroupKey::PlainText.reserved_title(), Some("Text"));
        assert_eq!(GroupKey::Ungrouped.reserved_description(), Some("Ungrouped"));
        assert_eq!(GroupKey::value("abc").reserved_title(), None);
    }

    #[test]
    fn display_renders_value_verbatim() {
        assert_eq!(GroupKey::value("abc").to_string(), "abc");
    }
}
