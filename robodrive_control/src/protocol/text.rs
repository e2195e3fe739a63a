//! Plain-text key protocol.
//!
//! One message per line: `'<key>' press`, `'<key>' release`, or the
//! bare token `exit` (case-sensitive). The key is the quoted single
//! lowercase character the keyboard listener prints.

use robodrive_common::control::{ControlEvent, Key, KeyEvent};

/// Shutdown sentinel.
pub const EXIT_TOKEN: &str = "exit";

/// Decode one text message. Surrounding whitespace is ignored.
pub fn decode(message: &str) -> ControlEvent {
    let message = message.trim();
    if message == EXIT_TOKEN {
        return ControlEvent::Exit;
    }
    parse_key_event(message).map_or(ControlEvent::Unrecognized, ControlEvent::Key)
}

fn parse_key_event(message: &str) -> Option<KeyEvent> {
    let (repr, action) = message.split_once(' ')?;
    let pressed = match action {
        "press" => true,
        "release" => false,
        _ => return None,
    };
    let key = parse_quoted_key(repr)?;
    Some(KeyEvent { key, pressed })
}

fn parse_quoted_key(repr: &str) -> Option<Key> {
    let inner = repr.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Key::from_char(c),
        _ => None,
    }
}

/// Encode a key edge the way the keyboard client sends it.
pub fn encode(event: KeyEvent) -> String {
    let action = if event.pressed { "press" } else { "release" };
    format!("'{}' {}", event.key.as_char(), action)
}
