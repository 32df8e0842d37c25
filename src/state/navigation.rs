//! Navigation state machine: group list → line list → line detail.
//!
//! The state owns the most recent [`Snapshot`] and tracks focus and selection
//! locally. Selection is tied to group identity, so a refresh that reorders the
//! groups keeps the user on the same group.

use crate::index::{GroupSnapshot, Snapshot};
use crate::model::{GroupKey, KeyAction, LogLine};
use std::collections::HashMap;
use std::sync::Arc;

/// Which pane receives cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The group list (initial).
    #[default]
    Groups,
    /// The selected group's line list.
    Lines,
    /// One line's full record.
    LineDetail,
}

/// Focus and selection over the latest snapshot.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    focus: Focus,
    snapshot: Snapshot,
    group_cursor: usize,
    selected_group: Option<GroupKey>,
    /// Remembered line cursor per group.
    line_positions: HashMap<GroupKey, usize>,
    /// Lines of the selected group, arrival order.
    lines: Vec<Arc<LogLine>>,
    line_cursor: usize,
    detail_line: Option<Arc<LogLine>>,
    detail_scroll: usize,
}

impl NavigationState {
    /// State over an initial snapshot, focused on the first group.
    pub fn new(snapshot: Snapshot) -> Self {
        let mut state = Self::default();
        state.apply_snapshot(snapshot);
        state
    }

    // ===== Accessors =====

    /// Pane that receives navigation keys.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Groups as of the last refresh.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Position of the selected group in the snapshot.
    pub fn group_cursor(&self) -> usize {
        self.group_cursor
    }

    /// Identity of the selected group, stable across refreshes.
    pub fn selected_group_key(&self) -> Option<&GroupKey> {
        self.selected_group.as_ref()
    }

    /// Snapshot entry under the group cursor.
    pub fn selected_group(&self) -> Option<&GroupSnapshot> {
        self.snapshot.get(self.group_cursor)
    }

    /// Lines of the selected group.
    pub fn lines(&self) -> &[Arc<LogLine>] {
        &self.lines
    }

    /// Position of the highlighted line in [`lines`](Self::lines).
    pub fn line_cursor(&self) -> usize {
        self.line_cursor
    }

    /// The line shown in the detail view. Only set while focus is `LineDetail`.
    pub fn detail_line(&self) -> Option<&Arc<LogLine>> {
        self.detail_line.as_ref()
    }

    /// First visible row of the detail view.
    pub fn detail_scroll(&self) -> usize {
        self.detail_scroll
    }

    // ===== Refresh =====

    /// Replace the snapshot, keeping the selected group by identity.
    ///
    /// If nothing was selected yet, the group at the current cursor position
    /// (clamped) becomes selected. The line list is recomputed from the
    /// selected group.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;

        let position = self
            .selected_group
            .as_ref()
            .and_then(|key| self.snapshot.position(key));

        match position {
            Some(position) => self.group_cursor = position,
            None => self.group_cursor = clamp(self.group_cursor, self.snapshot.len()),
        }

        self.sync_selected_group();
    }

    /// Clamp the detail scroll offset to `max_offset`.
    pub fn clamp_detail_scroll(&mut self, max_offset: usize) {
        self.detail_scroll = self.detail_scroll.min(max_offset);
    }

    // ===== Transitions =====

    /// Apply one user action. `page_size` is the number of visible rows.
    pub fn handle(&mut self, action: KeyAction, page_size: usize) {
        let page = page_size.max(1);
        match action {
            KeyAction::CursorUp => self.move_by(-1),
            KeyAction::CursorDown => self.move_by(1),
            KeyAction::PrevPage => self.move_by(-(page as isize)),
            KeyAction::NextPage => self.move_by(page as isize),
            KeyAction::GoToStart => self.move_to(0),
            KeyAction::GoToEnd => self.move_to(usize::MAX),
            KeyAction::Select => self.select(),
            KeyAction::Escape => self.escape(),
            KeyAction::Quit => {}
        }
    }

    fn select(&mut self) {
        match self.focus {
            Focus::Groups => {
                if self.selected_group.is_some() {
                    self.focus = Focus::Lines;
                }
            }
            Focus::Lines => {
                if let Some(line) = self.lines.get(self.line_cursor) {
                    self.detail_line = Some(Arc::clone(line));
                    self.detail_scroll = 0;
                    self.focus = Focus::LineDetail;
                }
            }
            Focus::LineDetail => {}
        }
    }

    fn escape(&mut self) {
        match self.focus {
            Focus::Groups => {}
            Focus::Lines => self.focus = Focus::Groups,
            Focus::LineDetail => {
                self.detail_line = None;
                self.detail_scroll = 0;
                self.focus = Focus::Lines;
            }
        }
    }

    fn move_by(&mut self, delta: isize) {
        let current = match self.focus {
            Focus::Groups => self.group_cursor,
            Focus::Lines => self.line_cursor,
            Focus::LineDetail => self.detail_scroll,
        };
        self.move_to(current.saturating_add_signed(delta));
    }

    fn move_to(&mut self, target: usize) {
        match self.focus {
            Focus::Groups => {
                let cursor = clamp(target, self.snapshot.len());
                if cursor != self.group_cursor || self.selected_group.is_none() {
                    self.group_cursor = cursor;
                    self.sync_selected_group();
                }
            }
            Focus::Lines => {
                self.line_cursor = clamp(target, self.lines.len());
                if let Some(key) = &self.selected_group {
                    self.line_positions.insert(key.clone(), self.line_cursor);
                }
            }
            // Clamped against the rendered height by the view.
            Focus::LineDetail => self.detail_scroll = target,
        }
    }

    /// Recompute the line list for the group under the cursor and restore its
    /// remembered line position.
    fn sync_selected_group(&mut self) {
        let Some(group) = self.snapshot.get(self.group_cursor) else {
            self.selected_group = None;
            self.lines.clear();
            self.line_cursor = 0;
            return;
        };

        let key = group.key().clone();
        self.lines = group.lines();

        let remembered = self.line_positions.get(&key).copied().unwrap_or(0);
        self.line_cursor = clamp(remembered, self.lines.len());
        self.selected_group = Some(key);
    }
}

/// Largest valid index for a list of `len` items (0 when empty).
fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
