//! UI state machine (pure).
//!
//! All state transitions are pure functions testable without a terminal.

pub mod app_state;
pub mod navigation;

// Re-export for convenience
pub use app_state::{
    handle_ingest_event, handle_key_action, AppState, StreamState, RECEIVING_STATUS,
    TERMINATED_STATUS,
};
pub use navigation::{Focus, NavigationState};
