//! Stream indicator for the status bar.
//!
//! - Blinking green `[LIVE]` while lines can still arrive
//! - Red `[DISCONNECTED]` once the stream has ended

use crate::state::StreamState;
use ratatui::{style::Style, text::Span};

const LIVE_TEXT: &str = "[LIVE] ";
const DISCONNECTED_TEXT: &str = "[DISCONNECTED] ";

/// Indicator widget driven by stream state and an external blink phase.
///
/// The blink phase is toggled by the event loop's timer, keeping this widget
/// pure.
#[derive(Debug, Clone)]
pub struct LiveIndicator {
    stream: StreamState,
    blink_on: bool,
}

impl LiveIndicator {
    /// Indicator for the given stream state and blink phase.
    pub fn new(stream: StreamState, blink_on: bool) -> Self {
        Self { stream, blink_on }
    }

    /// Render as a span using the palette's live / disconnected styles.
    ///
    /// While live with the blink phase off, the span is blank but keeps its
    /// width so the status text does not jump.
    pub fn render(&self, live: Style, disconnected: Style) -> Span<'static> {
        match self.stream {
            StreamState::Live if self.blink_on => Span::styled(LIVE_TEXT, live),
            StreamState::Live => Span::raw(" ".repeat(LIVE_TEXT.len())),
            StreamState::Disconnected => Span::styled(DISCONNECTED_TEXT, disconnected),
        }
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "live_indicator_tests.rs"]
mod tests;
