//! Wire protocols and the demultiplexer.
//!
//! - [`text`] - `'w' press` / `'w' release` / `exit`
//! - [`json`] - `{"type":"key",...}` / `{"type":"command",...}`
//!
//! Both decoders produce a [`ControlEvent`]; the [`Demultiplexer`] applies
//! it to the shared [`ControlState`].

pub mod json;
pub mod text;

use std::sync::Arc;

use robodrive_common::control::ControlEvent;
use tracing::{debug, info, warn};

use crate::state::{Applied, ControlState};

/// Message vocabulary of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Text,
    Json,
}

impl WireFormat {
    pub fn decode(self, message: &str) -> ControlEvent {
        match self {
            Self::Text => text::decode(message),
            Self::Json => json::decode(message),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Turns raw wire messages into state updates.
#[derive(Debug, Clone)]
pub struct Demultiplexer {
    state: Arc<ControlState>,
}

impl Demultiplexer {
    pub fn new(state: Arc<ControlState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<ControlState> {
        &self.state
    }

    /// Decode and apply one message. Malformed input is logged and
    /// leaves the state untouched.
    pub fn handle(&self, format: WireFormat, message: &str) -> Applied {
        let event = format.decode(message);
        let applied = self.state.apply(event);
        match applied {
            Applied::Updated(flags) => debug!(format = format.as_str(), ?event, ?flags, "applied"),
            Applied::Exit => info!(format = format.as_str(), "exit received"),
            Applied::Ignored => {
                warn!(format = format.as_str(), message = %message.trim(), "unrecognized message")
            }
        }
        applied
    }
}
