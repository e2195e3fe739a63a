//! Structured (JSON) protocol spoken over the WebSocket transport.
//!
//! Client → server:
//!
//! ```json
//! {"type": "key", "key": "w", "action": "down"}
//! {"type": "command", "cmd": "forward"}
//! ```
//!
//! A bare command word (`forward`, `stop`, ...) that is not JSON is
//! accepted as a `command` message.
//!
//! Server → client:
//!
//! ```json
//! {"type": "hello", "state": {"forward": false, "backward": false, "left": false, "right": false}}
//! {"type": "state", "state": {...}}
//! {"type": "error", "message": "unknown message"}
//! ```

use robodrive_common::control::{ControlEvent, DirectionFlags, DriveCommand, FlagsView, Key, KeyEvent};
use serde::{Deserialize, Serialize};

/// Reply text for anything that did not decode.
pub const UNKNOWN_MESSAGE: &str = "unknown message";

/// Raw client message, before field validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Key { key: String, action: String },
    Command { cmd: String },
}

impl ClientMessage {
    /// Validate fields into a control event.
    pub fn into_event(self) -> ControlEvent {
        match self {
            Self::Key { key, action } => {
                let pressed = match action.as_str() {
                    "down" => true,
                    "up" => false,
                    _ => return ControlEvent::Unrecognized,
                };
                let key = key.trim().to_ascii_lowercase();
                let mut chars = key.chars();
                match (chars.next().and_then(Key::from_char), chars.next()) {
                    (Some(key), None) => ControlEvent::Key(KeyEvent { key, pressed }),
                    _ => ControlEvent::Unrecognized,
                }
            }
            Self::Command { cmd } => {
                DriveCommand::from_name(&cmd).map_or(ControlEvent::Unrecognized, ControlEvent::Command)
            }
        }
    }
}

/// Decode one structured message.
pub fn decode(message: &str) -> ControlEvent {
    match serde_json::from_str::<ClientMessage>(message) {
        Ok(msg) => msg.into_event(),
        Err(_) => DriveCommand::from_name(message)
            .map_or(ControlEvent::Unrecognized, ControlEvent::Command),
    }
}

/// Build a key message.
pub fn key_message(event: KeyEvent) -> String {
    encode_client(&ClientMessage::Key {
        key: event.key.as_char().to_string(),
        action: if event.pressed { "down" } else { "up" }.to_string(),
    })
}

/// Build a command message.
pub fn command_message(command: DriveCommand) -> String {
    let cmd = match command {
        DriveCommand::Forward => "forward",
        DriveCommand::Backward => "backward",
        DriveCommand::Left => "left",
        DriveCommand::Right => "right",
        DriveCommand::Stop => "stop",
    };
    encode_client(&ClientMessage::Command { cmd: cmd.to_string() })
}

fn encode_client(msg: &ClientMessage) -> String {
    // Two string fields behind a tag; serialization cannot fail.
    serde_json::to_string(msg).unwrap_or_default()
}

/// Server reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Sent once on connect with the current flags.
    Hello { state: FlagsView },
    /// Ack carrying the flags after an accepted message.
    State { state: FlagsView },
    Error { message: String },
}

impl ServerMessage {
    pub fn hello(flags: DirectionFlags) -> Self {
        Self::Hello { state: flags.view() }
    }

    pub fn state(flags: DirectionFlags) -> Self {
        Self::State { state: flags.view() }
    }

    pub fn unknown() -> Self {
        Self::Error {
            message: UNKNOWN_MESSAGE.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
