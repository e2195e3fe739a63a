//! Direction flags, keys and motion commands.
//!
//! `DirectionFlags` is the held-key set written by the transports,
//! `MotionCommand` is the single instruction the arbitration engine
//! issues to the actuator. Both fit in one byte so the control state can
//! keep them in atomic cells.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Currently held directional keys.
    ///
    /// All 16 combinations are valid; flags are set directly by incoming
    /// events and never inferred from each other.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirectionFlags: u8 {
        /// `w` held.
        const FORWARD  = 0x01;
        /// `s` held.
        const BACKWARD = 0x02;
        /// `a` held.
        const LEFT     = 0x04;
        /// `d` held.
        const RIGHT    = 0x08;
    }
}

impl DirectionFlags {
    /// Build a flag set from the four individual booleans.
    #[inline]
    pub const fn from_bools(forward: bool, backward: bool, left: bool, right: bool) -> Self {
        let mut bits = 0;
        if forward {
            bits |= Self::FORWARD.bits();
        }
        if backward {
            bits |= Self::BACKWARD.bits();
        }
        if left {
            bits |= Self::LEFT.bits();
        }
        if right {
            bits |= Self::RIGHT.bits();
        }
        Self::from_bits_truncate(bits)
    }

    /// Wire/diagnostic view with one named boolean per direction.
    #[inline]
    pub const fn view(self) -> FlagsView {
        FlagsView {
            forward: self.contains(Self::FORWARD),
            backward: self.contains(Self::BACKWARD),
            left: self.contains(Self::LEFT),
            right: self.contains(Self::RIGHT),
        }
    }
}

impl Default for DirectionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Named-boolean form of [`DirectionFlags`], as carried in `state` messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagsView {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl From<FlagsView> for DirectionFlags {
    fn from(view: FlagsView) -> Self {
        Self::from_bools(view.forward, view.backward, view.left, view.right)
    }
}

impl From<DirectionFlags> for FlagsView {
    fn from(flags: DirectionFlags) -> Self {
        flags.view()
    }
}

/// Motion instruction currently believed active on the actuator.
///
/// `None` is the stopped/cleared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MotionCommand {
    /// Stopped, no motion requested.
    #[default]
    None = 0,
    Forward = 1,
    Backward = 2,
    Left = 3,
    Right = 4,
}

impl MotionCommand {
    /// Every variant, in discriminant order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
    ];

    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Forward),
            2 => Some(Self::Backward),
            3 => Some(Self::Left),
            4 => Some(Self::Right),
            _ => None,
        }
    }

    /// Lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "stop",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional key reported by a command source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
}

impl Key {
    /// Parse a single lowercase key character.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(Self::W),
            'a' => Some(Self::A),
            's' => Some(Self::S),
            'd' => Some(Self::D),
            _ => None,
        }
    }

    /// The direction flag this key drives.
    #[inline]
    pub const fn flag(self) -> DirectionFlags {
        match self {
            Self::W => DirectionFlags::FORWARD,
            Self::S => DirectionFlags::BACKWARD,
            Self::A => DirectionFlags::LEFT,
            Self::D => DirectionFlags::RIGHT,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::W => 'w',
            Self::A => 'a',
            Self::S => 's',
            Self::D => 'd',
        }
    }
}

/// Key edge: one key pressed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

/// Whole-state drive command from the structured protocol.
///
/// Applying one replaces the flag set rather than merging into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveCommand {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl DriveCommand {
    /// Parse a command name (case-insensitive, surrounding whitespace ignored).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }

    /// Flag set this command overrides the current state with.
    #[inline]
    pub const fn flags(self) -> DirectionFlags {
        match self {
            Self::Forward => DirectionFlags::FORWARD,
            Self::Backward => DirectionFlags::BACKWARD,
            Self::Left => DirectionFlags::LEFT,
            Self::Right => DirectionFlags::RIGHT,
            Self::Stop => DirectionFlags::empty(),
        }
    }
}

/// Normalized event produced by every wire decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Single key edge.
    Key(KeyEvent),
    /// Whole-state override.
    Command(DriveCommand),
    /// Shutdown sentinel.
    Exit,
    /// Anything else; ignored by the state.
    Unrecognized,
}
