//! TUI rendering and terminal management (impure shell)

pub mod entries;
mod layout;
pub mod live_indicator;
pub mod metadata;
mod styles;

pub use entries::{line_summary_text, ListEntry};
pub use layout::{detail_max_scroll, group_list_width, pane_areas, render_layout, PaneAreas};
pub use live_indicator::LiveIndicator;
pub use metadata::{metadata_rows, metadata_text, MetadataRow};
pub use styles::{ColorConfig, LevelClass, Palette};

use crate::config::KeyBindings;
use crate::index::Snapshot;
use crate::ingest::IngestEvent;
use crate::model::KeyAction;
use crate::state::{handle_ingest_event, handle_key_action, AppState};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long to wait for terminal input before checking the ingestion channel.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on ingestion events applied between two draws.
const MAX_EVENTS_PER_DRAIN: usize = 4 * crate::ingest::QUEUE_DEPTH;

/// Blink period of the `[LIVE]` indicator.
const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    events: Receiver<IngestEvent>,
    key_bindings: KeyBindings,
    palette: Palette,
    blink_on: bool,
    /// Set once the ingestion channel has closed, so it is not polled again.
    channel_closed: bool,
    /// The last drain stopped at [`MAX_EVENTS_PER_DRAIN`] with events left over.
    backlogged: bool,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen and mouse capture.
    pub fn new(
        snapshot: Snapshot,
        events: Receiver<IngestEvent>,
        palette: Palette,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self::with_terminal(
            terminal,
            AppState::new(snapshot),
            events,
            KeyBindings::default(),
            palette,
        ))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits. Each tick polls the terminal with a short
    /// timeout, drains the ingestion channel, and redraws when anything changed.
    pub fn run(&mut self) -> Result<(), TuiError> {
        let mut last_blink = Instant::now();
        self.draw()?;

        loop {
            let mut dirty = false;

            let wait = if self.backlogged {
                Duration::ZERO
            } else {
                TICK_INTERVAL
            };
            if event::poll(wait)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => dirty = self.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        debug!("Handling resize to {}x{}", width, height);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            dirty |= self.drain_events();

            if self.app_state.is_live() && last_blink.elapsed() >= BLINK_INTERVAL {
                self.blink_on = !self.blink_on;
                last_blink = Instant::now();
                dirty = true;
            }

            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    fn with_terminal(
        terminal: Terminal<B>,
        app_state: AppState,
        events: Receiver<IngestEvent>,
        key_bindings: KeyBindings,
        palette: Palette,
    ) -> Self {
        Self {
            terminal,
            app_state,
            events,
            key_bindings,
            palette,
            blink_on: true,
            channel_closed: false,
            backlogged: false,
        }
    }

    /// Apply every pending ingestion event.
    ///
    /// Only the newest snapshot is applied; the last non-empty status wins.
    /// At most [`MAX_EVENTS_PER_DRAIN`] events are taken so a busy producer
    /// cannot starve drawing. Returns true if the state changed.
    fn drain_events(&mut self) -> bool {
        if self.channel_closed {
            return false;
        }

        let mut latest: Option<Snapshot> = None;
        let mut status: Option<String> = None;
        let mut disconnected = false;
        self.backlogged = false;

        for taken in 0.. {
            if taken == MAX_EVENTS_PER_DRAIN {
                self.backlogged = true;
                break;
            }
            match self.events.try_recv() {
                Ok(IngestEvent::Scanned {
                    snapshot,
                    status: line_status,
                }) => {
                    latest = Some(snapshot);
                    if let Some(s) = line_status.filter(|s| !s.is_empty()) {
                        status = Some(s);
                    }
                }
                Ok(IngestEvent::Disconnected) => disconnected = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // The sender is gone; a missing Disconnected event means the
                    // ingestion thread died.
                    self.channel_closed = true;
                    if self.app_state.is_live() && !disconnected {
                        warn!("Ingestion channel closed without a disconnect event");
                        disconnected = true;
                    }
                    break;
                }
            }
        }

        if latest.is_none() && status.is_none() && !disconnected {
            return false;
        }
        let mut state = std::mem::take(&mut self.app_state);

        if latest.is_some() || status.is_some() {
            let snapshot = latest.unwrap_or_else(|| state.navigation.snapshot().clone());
            state = handle_ingest_event(state, IngestEvent::Scanned { snapshot, status });
        }
        if disconnected {
            info!("Input stream disconnected");
            state = handle_ingest_event(state, IngestEvent::Disconnected);
        }

        self.app_state = state;
        true
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        self.apply(action);
        self.app_state.should_quit()
    }

    /// Mouse wheel moves the focused cursor. Returns true if handled.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let action = match mouse.kind {
            MouseEventKind::ScrollUp => KeyAction::CursorUp,
            MouseEventKind::ScrollDown => KeyAction::CursorDown,
            _ => return false,
        };
        self.apply(action);
        true
    }

    fn apply(&mut self, action: KeyAction) {
        let page = layout::page_size(&pane_areas(self.frame_area()), self.app_state.navigation.focus());
        let state = std::mem::take(&mut self.app_state);
        self.app_state = handle_key_action(state, action, page);
    }

    fn frame_area(&self) -> Rect {
        match self.terminal.size() {
            Ok(size) => Rect::new(0, 0, size.width, size.height),
            Err(_) => Rect::new(0, 0, 80, 24),
        }
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let areas = pane_areas(self.frame_area());
        let max_scroll = detail_max_scroll(&self.app_state, &areas, &self.palette);
        self.app_state.navigation.clamp_detail_scroll(max_scroll);

        let state = &self.app_state;
        let palette = &self.palette;
        let blink_on = self.blink_on;
        self.terminal
            .draw(|frame| render_layout(frame, state, palette, blink_on))?;
        Ok(())
    }
}

// ===== Test Helpers =====

#[cfg(test)]
impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Create TuiApp for testing without touching the real terminal.
    pub(crate) fn new_for_test(
        terminal: Terminal<B>,
        app_state: AppState,
        events: Receiver<IngestEvent>,
    ) -> Self {
        Self::with_terminal(
            terminal,
            app_state,
            events,
            KeyBindings::default(),
            Palette::default(),
        )
    }

    pub(crate) fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Initialize and run the TUI over the ingestion channel.
///
/// Logging must be initialized by the caller. The terminal is restored even
/// when the event loop fails.
pub fn run(
    snapshot: Snapshot,
    events: Receiver<IngestEvent>,
    palette: Palette,
) -> Result<(), TuiError> {
    let mut app = TuiApp::new(snapshot, events, palette)?;
    let result = app.run();

    if let Err(err) = restore_terminal() {
        warn!(error = %err, "Failed to restore terminal");
        return result.and(Err(err));
    }
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
