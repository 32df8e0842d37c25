//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Defaults follow pager conventions: arrows plus vim keys for single steps,
/// `h`/`l` and `b`/`f`/`u`/`d` for pages.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only the code and modifiers take part in the lookup.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: KeyAction) {
        self.bindings.insert(KeyEvent::new(code, modifiers), action);
    }

    fn bind_chars(&mut self, chars: &str, action: KeyAction) {
        for c in chars.chars() {
            self.bind(KeyCode::Char(c), KeyModifiers::NONE, action);
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self {
            bindings: HashMap::new(),
        };

        // Single steps
        keys.bind(KeyCode::Up, KeyModifiers::NONE, KeyAction::CursorUp);
        keys.bind(KeyCode::Down, KeyModifiers::NONE, KeyAction::CursorDown);
        keys.bind_chars("k", KeyAction::CursorUp);
        keys.bind_chars("j", KeyAction::CursorDown);

        // Pages
        keys.bind(KeyCode::PageUp, KeyModifiers::NONE, KeyAction::PrevPage);
        keys.bind(KeyCode::PageDown, KeyModifiers::NONE, KeyAction::NextPage);
        keys.bind_chars("hbu", KeyAction::PrevPage);
        keys.bind_chars("lfd", KeyAction::NextPage);

        // Ends
        keys.bind(KeyCode::Home, KeyModifiers::NONE, KeyAction::GoToStart);
        keys.bind(KeyCode::End, KeyModifiers::NONE, KeyAction::GoToEnd);
        keys.bind_chars("g", KeyAction::GoToStart);
        keys.bind_chars("G", KeyAction::GoToEnd);
        keys.bind(KeyCode::Char('G'), KeyModifiers::SHIFT, KeyAction::GoToEnd);

        // Focus
        keys.bind(KeyCode::Enter, KeyModifiers::NONE, KeyAction::Select);
        keys.bind(KeyCode::Right, KeyModifiers::NONE, KeyAction::Select);
        keys.bind(KeyCode::Esc, KeyModifiers::NONE, KeyAction::Escape);
        keys.bind(KeyCode::Left, KeyModifiers::NONE, KeyAction::Escape);

        // Application
        keys.bind_chars("q", KeyAction::Quit);
        keys.bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);

        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn vim_and_arrow_keys_move_cursor() {
        let keys = KeyBindings::default();
        assert_eq!(keys.get(key(KeyCode::Char('j'))), Some(KeyAction::CursorDown));
        assert_eq!(keys.get(key(KeyCode::Down)), Some(KeyAction::CursorDown));
        assert_eq!(keys.get(key(KeyCode::Char('k'))), Some(KeyAction::CursorUp));
        assert_eq!(keys.get(key(KeyCode::Up)), Some(KeyAction::CursorUp));
    }

    #[test]
    fn page_keys() {
        let keys = KeyBindings::default();
        for c in ['h', 'b', 'u'] {
            assert_eq!(keys.get(key(KeyCode::Char(c))), Some(KeyAction::PrevPage), "key {c}");
        }
        for c in ['l', 'f', 'd'] {
            assert_eq!(keys.get(key(KeyCode::Char(c))), Some(KeyAction::NextPage), "key {c}");
        }
        assert_eq!(keys.get(key(KeyCode::PageDown)), Some(KeyAction::NextPage));
    }

    #[test]
    fn shifted_g_goes_to_end() {
        let keys = KeyBindings::default();
        assert_eq!(
            keys.get(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            Some(KeyAction::GoToEnd)
        );
        assert_eq!(keys.get(key(KeyCode::Char('G'))), Some(KeyAction::GoToEnd));
        assert_eq!(keys.get(key(KeyCode::Char('g'))), Some(KeyAction::GoToStart));
    }

    #[test]
    fn enter_and_escape_change_focus() {
        let keys = KeyBindings::default();
        assert_eq!(keys.get(key(KeyCode::Enter)), Some(KeyAction::Select));
        assert_eq!(keys.get(key(KeyCode::Right)), Some(KeyAction::Select));
        assert_eq!(keys.get(key(KeyCode::Esc)), Some(KeyAction::Escape));
        assert_eq!(keys.get(key(KeyCode::Left)), Some(KeyAction::Escape));
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let keys = KeyBindings::default();
        assert_eq!(
            keys.get(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(keys.get(key(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(keys.get(key(KeyCode::Char('c'))), None, "plain c is unbound");
    }

    #[test]
    fn lookup_ignores_event_kind_and_state() {
        let keys = KeyBindings::default();
        let repeat = KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Repeat,
            state: KeyEventState::NONE,
        };
        assert_eq!(keys.get(repeat), Some(KeyAction::CursorDown));
    }
}
