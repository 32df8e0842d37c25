//! Screen layout: group list, line list or detail, status bar.
//!
//! Pure layout logic; the event loop owns the terminal.

use crate::model::LogLine;
use crate::state::{AppState, Focus};
use crate::view::entries::{highlight, line_summary, ListEntry};
use crate::view::live_indicator::LiveIndicator;
use crate::view::metadata::metadata_lines;
use crate::view::styles::Palette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame,
};
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Share of the width given to the group list.
const GROUP_LIST_PERCENT: u16 = 30;

/// Narrowest group list, in columns.
const GROUP_LIST_MIN_WIDTH: u16 = 30;

/// Rows taken by a pane's border.
const BORDER_ROWS: u16 = 2;

// ===== Areas =====

/// Where each part of the screen goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneAreas {
    /// Group list, left.
    pub groups: Rect,
    /// Line list or line detail, right.
    pub right: Rect,
    /// One-row status bar.
    pub status: Rect,
}

/// Width of the group list for a terminal `total` columns wide.
pub fn group_list_width(total: u16) -> u16 {
    let share = (u32::from(total) * u32::from(GROUP_LIST_PERCENT) / 100) as u16;
    share.max(GROUP_LIST_MIN_WIDTH).min(total)
}

/// Split the terminal into the two panes and the status bar.
pub fn pane_areas(area: Rect) -> PaneAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(group_list_width(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[0]);

    PaneAreas {
        groups: horizontal[0],
        right: horizontal[1],
        status: vertical[1],
    }
}

/// Rows inside a bordered pane.
fn inner_height(area: Rect) -> usize {
    usize::from(area.height.saturating_sub(BORDER_ROWS))
}

/// Entries of a `len`-entry list drawn in `height` rows with `cursor` on screen.
///
/// Once the cursor passes the first page it sits on the bottom row.
pub fn visible_window(len: usize, cursor: usize, height: usize) -> Range<usize> {
    let last = len.saturating_sub(1);
    let start = cursor.min(last).saturating_sub(height.max(1) - 1);
    start..(start + height.max(1)).min(len)
}

/// Inner width of a bordered pane.
fn inner_width(area: Rect) -> usize {
    usize::from(area.width.saturating_sub(2))
}

/// Entries per page for the focused pane.
pub fn page_size(areas: &PaneAreas, focus: Focus) -> usize {
    match focus {
        // Group entries are two rows tall.
        Focus::Groups => (inner_height(areas.groups) / 2).max(1),
        Focus::Lines | Focus::LineDetail => inner_height(areas.right).max(1),
    }
}

// ===== Detail =====

/// Detail content: line summary, a blank row, then the record tree.
pub fn detail_lines(line: &LogLine, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![line_summary(line, palette), Line::default()];
    lines.extend(metadata_lines(line.data(), palette));
    lines
}

/// Hard-wrap styled lines to `width` columns.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut wrapped = Vec::with_capacity(lines.len());

    for line in lines {
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut row_width = 0;

        for span in line.spans {
            let mut segment = String::new();
            for ch in span.content.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if row_width + ch_width > width && row_width > 0 {
                    if !segment.is_empty() {
                        row.push(Span::styled(std::mem::take(&mut segment), span.style));
                    }
                    wrapped.push(Line::from(std::mem::take(&mut row)));
                    row_width = 0;
                }
                segment.push(ch);
                row_width += ch_width;
            }
            if !segment.is_empty() {
                row.push(Span::styled(segment, span.style));
            }
        }

        wrapped.push(Line::from(row));
    }

    wrapped
}

/// Largest useful scroll offset for the detail pane.
pub fn detail_max_scroll(state: &AppState, areas: &PaneAreas, palette: &Palette) -> usize {
    let Some(line) = state.navigation.detail_line() else {
        return 0;
    };
    let rows = wrap_lines(detail_lines(line, palette), inner_width(areas.right)).len();
    rows.saturating_sub(inner_height(areas.right))
}

// ===== Rendering =====

/// Render the whole screen.
pub fn render_layout(frame: &mut Frame, state: &AppState, palette: &Palette, blink_on: bool) {
    let areas = pane_areas(frame.area());
    let focus = state.navigation.focus();

    render_groups(frame, areas.groups, state, palette, focus == Focus::Groups);
    match focus {
        Focus::LineDetail => render_detail(frame, areas.right, state, palette),
        Focus::Groups | Focus::Lines => {
            render_lines(frame, areas.right, state, palette, focus == Focus::Lines)
        }
    }
    render_status_bar(frame, areas.status, state, palette, blink_on);
}

fn pane_block(title: &'static str, active: bool, palette: &Palette) -> Block<'static> {
    let border = if active {
        palette.active_border
    } else {
        palette.inactive_border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_groups(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette, active: bool) {
    let snapshot = state.navigation.snapshot();
    let items: Vec<_> = snapshot
        .groups()
        .iter()
        .map(|group| ListEntry::Group(group).to_item(palette))
        .collect();

    let title = if active { "Groups (active)" } else { "Groups" };
    let list = List::new(items)
        .block(pane_block(title, active, palette))
        .highlight_style(highlight(palette, active));

    let mut list_state = ListState::default();
    if !snapshot.is_empty() {
        list_state.select(Some(state.navigation.group_cursor()));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_lines(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette, active: bool) {
    let lines = state.navigation.lines();
    let cursor = state.navigation.line_cursor();
    let window = visible_window(lines.len(), cursor, inner_height(area));
    let items: Vec<_> = lines[window.clone()]
        .iter()
        .map(|line| ListEntry::Line(line.as_ref()).to_item(palette))
        .collect();

    let title = if active { "Logs (active)" } else { "Logs" };
    let list = List::new(items)
        .block(pane_block(title, active, palette))
        .highlight_style(highlight(palette, active));

    let mut list_state = ListState::default();
    if !lines.is_empty() {
        list_state.select(Some(cursor.saturating_sub(window.start)));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let block = pane_block("Detail", true, palette);
    let Some(line) = state.navigation.detail_line() else {
        frame.render_widget(block, area);
        return;
    };

    let rows = wrap_lines(detail_lines(line, palette), inner_width(area));
    let scroll = u16::try_from(state.navigation.detail_scroll()).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(rows).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Key hints for the focused pane.
pub fn key_hints(focus: Focus) -> &'static str {
    match focus {
        Focus::Groups => "↑↓ move · pgup/pgdn page · →/enter open · q quit",
        Focus::Lines => "↑↓ move · pgup/pgdn page · →/enter open · ←/esc back · q quit",
        Focus::LineDetail => "↑↓ scroll · pgup/pgdn page · ←/esc back · q quit",
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette, blink_on: bool) {
    let indicator = LiveIndicator::new(state.stream(), blink_on);
    let line = Line::from(vec![
        Span::styled(state.status().to_string(), palette.text),
        Span::raw(" "),
        indicator.render(palette.live, palette.disconnected),
        Span::styled(key_hints(state.navigation.focus()), palette.dim),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

// ===== Tests =====

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
