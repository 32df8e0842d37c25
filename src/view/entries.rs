//! List entries: groups on the left, lines on the right.
//!
//! Both lists render through [`ListEntry::to_item`], a single dispatch over the
//! two entry kinds.

use crate::index::GroupSnapshot;
use crate::model::LogLine;
use crate::view::styles::Palette;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};
use unicode_width::UnicodeWidthStr;

/// Columns taken by the level label, padding included.
pub const LABEL_WIDTH: usize = 9;

/// Characters of the level shown in the label.
const LABEL_CHARS: usize = 4;

/// Something shown in one of the two lists.
#[derive(Debug, Clone, Copy)]
pub enum ListEntry<'a> {
    /// A row of the group list.
    Group(&'a GroupSnapshot),
    /// A row of the line list.
    Line(&'a LogLine),
}

impl ListEntry<'_> {
    /// Rows the entry occupies.
    pub fn height(&self) -> usize {
        match self {
            ListEntry::Group(_) => 2,
            ListEntry::Line(_) => 1,
        }
    }

    /// Styled list item for either list.
    pub fn to_item(&self, palette: &Palette) -> ListItem<'static> {
        match self {
            ListEntry::Group(group) => ListItem::new(vec![
                Line::from(Span::styled(
                    group.title().to_string(),
                    palette.text.add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(group_description(group), palette.dim)),
            ]),
            ListEntry::Line(line) => ListItem::new(line_summary(line, palette)),
        }
    }
}

/// Second row of a group entry: description and line count.
pub fn group_description(group: &GroupSnapshot) -> String {
    let count = group.len();
    let noun = if count == 1 { "line" } else { "lines" };
    format!("{} · {} {}", group.description(), count, noun)
}

/// The level label: up to four upper-cased characters, padded to [`LABEL_WIDTH`].
pub fn level_label(level: &str) -> String {
    let label = format!(" {} ", short_level(level));
    let width = label.width();
    format!("{}{}", label, " ".repeat(LABEL_WIDTH.saturating_sub(width)))
}

/// One-row summary of a line: level label, flattened message, then tags.
pub fn line_summary(line: &LogLine, palette: &Palette) -> Line<'static> {
    let label = format!(" {} ", short_level(line.level()));
    let padding = " ".repeat(LABEL_WIDTH.saturating_sub(label.width()));

    let mut spans = vec![
        Span::styled(label, palette.level_label(line.level())),
        Span::raw(padding),
        Span::styled(flatten(line.message()), palette.message(line.level())),
    ];

    if !line.tags().is_empty() {
        spans.push(Span::raw("   "));
    }
    for tag in line.tags() {
        spans.push(Span::raw(" "));
        match tag.value() {
            Some(value) => {
                spans.push(Span::styled(tag.name().to_string(), palette.tag_name));
                spans.push(Span::raw(" "));
                spans.push(Span::styled(value.to_string(), palette.tag_value));
            }
            None => spans.push(Span::styled(tag.name().to_string(), palette.tag_solo)),
        }
    }

    Line::from(spans)
}

/// Plain text of [`line_summary`].
pub fn line_summary_text(line: &LogLine) -> String {
    line_summary(line, &Palette::default())
        .spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect()
}

fn short_level(level: &str) -> String {
    level
        .chars()
        .take(LABEL_CHARS)
        .collect::<String>()
        .to_uppercase()
}

fn flatten(message: &str) -> String {
    message.replace("\r\n", " ").replace('\n', " ")
}

/// Highlight style for the selected row of a list; inactive lists keep no highlight.
pub fn highlight(palette: &Palette, active: bool) -> Style {
    if active {
        palette.selected
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}
