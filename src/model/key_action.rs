//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that key bindings map to.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Cursor movement
    /// Move the focused cursor up one row (or scroll detail up). Default: k/↑
    CursorUp,
    /// Move the focused cursor down one row (or scroll detail down). Default: j/↓
    CursorDown,
    /// Move up one page. Default: h/b/u/Page Up
    PrevPage,
    /// Move down one page. Default: l/f/d/Page Down
    NextPage,
    /// Jump to the first row. Default: g/Home
    GoToStart,
    /// Jump to the last row. Default: G/End
    GoToEnd,

    // Focus transitions
    /// Descend: group list → line list → line detail. Default: Enter/→
    Select,
    /// Ascend: line detail → line list → group list. Default: Esc/←
    Escape,

    // Application
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}
