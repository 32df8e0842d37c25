//! Application state: navigation plus stream status.

use super::navigation::NavigationState;
use crate::index::Snapshot;
use crate::ingest::IngestEvent;
use crate::model::KeyAction;

/// Status text shown until the first status rule fires.
pub const RECEIVING_STATUS: &str = "Logs receiving";

/// Status text shown once the input stream has ended.
pub const TERMINATED_STATUS: &str = "Process has terminated";

// ===== StreamState =====

/// Whether new lines can still arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Reading from the input stream.
    #[default]
    Live,
    /// The stream ended or failed; the UI keeps browsing what was ingested.
    Disconnected,
}

// ===== AppState =====

/// Everything the UI renders, updated by pure handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Focus and selection.
    pub navigation: NavigationState,
    status: String,
    stream: StreamState,
    should_quit: bool,
}

impl AppState {
    /// Live state over an initial snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            navigation: NavigationState::new(snapshot),
            status: RECEIVING_STATUS.to_string(),
            stream: StreamState::Live,
            should_quit: false,
        }
    }

    /// Text of the status bar.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether input is still arriving.
    pub fn stream(&self) -> StreamState {
        self.stream
    }

    /// Input is still open.
    pub fn is_live(&self) -> bool {
        self.stream == StreamState::Live
    }

    /// Quit was requested.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

/// Fold one ingestion event into the state.
///
/// A non-empty status replaces the status line; an absent one leaves it alone.
pub fn handle_ingest_event(mut state: AppState, event: IngestEvent) -> AppState {
    match event {
        IngestEvent::Scanned { snapshot, status } => {
            state.navigation.apply_snapshot(snapshot);
            if let Some(status) = status.filter(|s| !s.is_empty()) {
                state.status = status;
            }
        }
        IngestEvent::Disconnected => {
            state.stream = StreamState::Disconnected;
            state.status = TERMINATED_STATUS.to_string();
        }
    }
    state
}

/// Apply one key action.
pub fn handle_key_action(mut state: AppState, action: KeyAction, page_size: usize) -> AppState {
    match action {
        KeyAction::Quit => state.should_quit = true,
        other => state.navigation.handle(other, page_size),
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::GroupIndex;
    use crate::model::{GroupKey, LogLine};
    use crate::state::Focus;
    use chrono::Utc;

    fn scanned(snapshot: Snapshot, status: Option<&str>) -> IngestEvent {
        IngestEvent::Scanned {
            snapshot,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn new_state_is_live_and_receiving() {
        let state = AppState::new(Snapshot::default());
        assert!(state.is_live());
        assert_eq!(state.status(), RECEIVING_STATUS);
        assert!(!state.should_quit());
    }

    #[test]
    fn status_updates_only_when_present() {
        let mut state = AppState::new(Snapshot::default());

        state = handle_ingest_event(state, scanned(Snapshot::default(), Some("Deploying")));
        assert_eq!(state.status(), "Deploying");

        state = handle_ingest_event(state, scanned(Snapshot::default(), None));
        assert_eq!(state.status(), "Deploying", "absent status keeps the last one");

        state = handle_ingest_event(state, scanned(Snapshot::default(), Some("")));
        assert_eq!(state.status(), "Deploying", "empty status is ignored");
    }

    #[test]
    fn disconnect_is_terminal_and_shown() {
        let state = handle_ingest_event(
            AppState::new(Snapshot::default()),
            IngestEvent::Disconnected,
        );
        assert_eq!(state.stream(), StreamState::Disconnected);
        assert_eq!(state.status(), TERMINATED_STATUS);
    }

    #[test]
    fn scanned_snapshot_reaches_navigation() {
        let mut index = GroupIndex::new();
        index.upsert(
            GroupKey::value("r1"),
            "title".to_string(),
            "Request".to_string(),
            LogLine::bare("info", Utc::now() + chrono::Duration::hours(1), "hello"),
        );

        let state = handle_ingest_event(
            AppState::new(Snapshot::default()),
            scanned(index.snapshot(), None),
        );
        assert_eq!(
            state.navigation.selected_group_key(),
            Some(&GroupKey::value("r1"))
        );
    }

    #[test]
    fn quit_sets_flag_and_other_actions_navigate() {
        let mut index = GroupIndex::new();
        index.upsert(
            GroupKey::value("r1"),
            "t".to_string(),
            "d".to_string(),
            LogLine::bare("info", Utc::now(), "m"),
        );
        let mut state = AppState::new(index.snapshot());

        state = handle_key_action(state, KeyAction::Select, 10);
        assert_eq!(state.navigation.focus(), Focus::Lines);

        state = handle_key_action(state, KeyAction::Quit, 10);
        assert!(state.should_quit());
    }
}
