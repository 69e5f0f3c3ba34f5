//! Keyboard mapping for interactive sessions

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::SessionKey;

/// Keys of the `control` keypad as `(key, legend, action)`.
pub const REMOTE_KEYMAP: &[(SessionKey, &str, &str)] = &[
    (SessionKey::Char('p'), "p", "poweroff"),
    (SessionKey::Char('+'), "+", "volumeup"),
    (SessionKey::Char('-'), "-", "volumedown"),
    (SessionKey::Char('m'), "m", "mute"),
    (SessionKey::Up, "↑", "up"),
    (SessionKey::Down, "↓", "down"),
    (SessionKey::Left, "←", "left"),
    (SessionKey::Right, "→", "right"),
    (SessionKey::Enter, "enter", "select"),
    (SessionKey::Char('b'), "b", "back"),
    (SessionKey::Char('h'), "h", "home"),
    (SessionKey::Char('r'), "r", "rev"),
    (SessionKey::Char('f'), "f", "fwd"),
    (SessionKey::Char(' '), "space", "play"),
    (SessionKey::Char('i'), "i", "replay"),
    (SessionKey::Tab, "tab", "info"),
    (SessionKey::Backspace, "backspace", "backspace"),
    (SessionKey::Char('/'), "/", "search"),
    (SessionKey::Ctrl('f'), "ctrl+f", "find"),
    (SessionKey::PageUp, "pgup", "channelup"),
    (SessionKey::PageDown, "pgdown", "channeldown"),
    (SessionKey::Char('t'), "t", "tuner"),
    (SessionKey::Char('1'), "1", "HDMI1"),
    (SessionKey::Char('2'), "2", "HDMI2"),
    (SessionKey::Char('3'), "3", "HDMI3"),
    (SessionKey::Char('4'), "4", "HDMI4"),
];

/// Translate a terminal key event. Releases, repeats and unsupported keys
/// map to `None`.
pub fn from_crossterm(event: KeyEvent) -> Option<SessionKey> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let key = match event.code {
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            SessionKey::Ctrl(c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => SessionKey::Char(c),
        KeyCode::Up => SessionKey::Up,
        KeyCode::Down => SessionKey::Down,
        KeyCode::Left => SessionKey::Left,
        KeyCode::Right => SessionKey::Right,
        KeyCode::Enter => SessionKey::Enter,
        KeyCode::Esc => SessionKey::Esc,
        KeyCode::Tab => SessionKey::Tab,
        KeyCode::Backspace => SessionKey::Backspace,
        KeyCode::PageUp => SessionKey::PageUp,
        KeyCode::PageDown => SessionKey::PageDown,
        _ => return None,
    };
    Some(key)
}
