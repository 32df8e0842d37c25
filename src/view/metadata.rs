//! Pretty-printer for a decoded record as a sorted key/value tree.
//!
//! Keys are sorted, nested maps are indented under their key, and lists are
//! joined with `, `. The printer is independent of the template engine.

use crate::model::Record;
use crate::view::styles::Palette;
use ratatui::text::{Line, Span};
use serde_json::Value;

/// Width of the key column, padding included.
pub const KEY_WIDTH: usize = 25;

/// Indentation added per nesting level.
pub const INDENT: usize = 8;

/// One printed row of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    /// Nesting level; each level indents by [`INDENT`].
    pub depth: usize,
    /// Empty on continuation rows of a multi-line value.
    pub key: String,
    /// `None` for the header row of a nested map.
    pub value: Option<String>,
}

impl MetadataRow {
    fn indent(&self) -> String {
        " ".repeat(self.depth * INDENT)
    }

    fn padded_key(&self) -> String {
        let width = unicode_width::UnicodeWidthStr::width(self.key.as_str());
        if width >= KEY_WIDTH {
            format!("{} ", self.key)
        } else {
            format!("{}{}", self.key, " ".repeat(KEY_WIDTH - width))
        }
    }

    /// Plain rendering without trailing whitespace.
    pub fn to_text(&self) -> String {
        match &self.value {
            Some(value) => format!("{}{}{}", self.indent(), self.padded_key(), value)
                .trim_end()
                .to_string(),
            None => format!("{}{}", self.indent(), self.key),
        }
    }
}

/// Flatten `record` into rows, keys sorted at every level.
pub fn metadata_rows(record: &Record) -> Vec<MetadataRow> {
    let mut rows = Vec::new();
    push_map(record, 0, &mut rows);
    rows
}

/// The whole tree as newline-separated text.
pub fn metadata_text(record: &Record) -> String {
    metadata_rows(record)
        .iter()
        .map(MetadataRow::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The tree as styled lines for the detail view.
pub fn metadata_lines(record: &Record, palette: &Palette) -> Vec<Line<'static>> {
    metadata_rows(record)
        .into_iter()
        .map(|row| match &row.value {
            Some(value) => Line::from(vec![
                Span::raw(row.indent()),
                Span::styled(row.padded_key(), palette.metadata_key),
                Span::styled(value.clone(), palette.metadata_value),
            ]),
            None => Line::from(vec![
                Span::raw(row.indent()),
                Span::styled(row.key.clone(), palette.metadata_key),
            ]),
        })
        .collect()
}

fn push_map(map: &Record, depth: usize, rows: &mut Vec<MetadataRow>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    for key in keys {
        let Some(value) = map.get(key) else { continue };
        match value {
            Value::Object(child) => {
                rows.push(MetadataRow {
                    depth,
                    key: key.clone(),
                    value: None,
                });
                push_map(child, depth + 1, rows);
            }
            other => {
                let rendered = scalar(other);
                let mut parts = rendered.split('\n');
                let first = parts.next().unwrap_or_default();
                rows.push(MetadataRow {
                    depth,
                    key: key.clone(),
                    value: Some(first.to_string()),
                });
                for rest in parts {
                    rows.push(MetadataRow {
                        depth,
                        key: String::new(),
                        value: Some(rest.to_string()),
                    });
                }
            }
        }
    }
}

/// Render a non-map value on one logical line.
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => item.to_string(),
                other => scalar(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

fn number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn flat_record_sorted_by_key() {
        let data = record(json!({"user": "ann", "level": "info", "count": 3, "ok": true}));
        insta::assert_snapshot!(metadata_text(&data), @r"
        count                    3
        level                    info
        ok                       true
        user                     ann
        ");
    }

    #[test]
    fn nested_maps_are_indented() {
        let data = record(json!({
            "http": {"method": "GET", "status": 200, "headers": {"host": "example.org"}},
            "msg": "done"
        }));
        insta::assert_snapshot!(metadata_text(&data), @r"
        http
                headers
                        host                     example.org
                method                   GET
                status                   200
        msg                      done
        ");
    }

    #[test]
    fn lists_are_comma_joined() {
        let data = record(json!({"ids": [1, 2.5, "x", null, [3]], "empty": []}));
        let rows = metadata_rows(&data);
        assert_eq!(rows[0].key, "empty");
        assert_eq!(rows[0].to_text(), "empty", "empty list leaves no trailing padding");
        assert_eq!(rows[1].value.as_deref(), Some("1, 2.5, x, null, [3]"));
    }

    #[test]
    fn long_keys_keep_one_space_before_value() {
        let data = record(json!({"a_really_long_field_name_here": "v"}));
        assert_eq!(metadata_text(&data), "a_really_long_field_name_here v");
    }

    #[test]
    fn multi_line_string_continues_in_value_column() {
        let data = record(json!({"stack": "line one\nline two"}));
        let rows = metadata_rows(&data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key, "");
        assert_eq!(
            rows[1].to_text(),
            format!("{}line two", " ".repeat(KEY_WIDTH))
        );
    }

    #[test]
    fn styled_lines_match_rows() {
        let data = record(json!({"a": 1, "b": {"c": 2}}));
        let lines = metadata_lines(&data, &Palette::default());
        assert_eq!(lines.len(), 3);
        let text: String = lines[2].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text.trim_end(), format!("{}c{}2", " ".repeat(INDENT), " ".repeat(KEY_WIDTH - 1)));
    }

    #[test]
    fn empty_record_prints_nothing() {
        assert_eq!(metadata_text(&Record::new()), "");
    }
}
