//! Shared control state.
//!
//! The four direction flags live in one `AtomicU8`, so a single load is a
//! consistent snapshot of the whole tuple and a key edge is a single
//! read-modify-write of one bit. The previous command and the shutdown
//! flag sit beside them.
//!
//! Writers: transports (flags, shutdown). Reader/mutator: the arbitration
//! engine (reads flags, writes the previous command).

use robodrive_common::control::{ControlEvent, DirectionFlags, Key, MotionCommand};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Result of applying one decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Flags were written; carries the set after the write.
    Updated(DirectionFlags),
    /// Shutdown was requested.
    Exit,
    /// Event carried nothing actionable; state untouched.
    Ignored,
}

/// Direction flags, previous command and shutdown flag.
///
/// Created once at startup with all flags clear and previous command
/// `None`.
#[derive(Debug)]
pub struct ControlState {
    flags: AtomicU8,
    previous: AtomicU8,
    shutdown: AtomicBool,
}

impl ControlState {
    /// Fresh state: no keys held, stopped, running.
    pub const fn new() -> Self {
        Self {
            flags: AtomicU8::new(0),
            previous: AtomicU8::new(MotionCommand::None as u8),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Fresh state behind an `Arc`, ready to hand to threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // ─── Flags ──────────────────────────────────────────────────────

    /// Consistent snapshot of all four flags.
    #[inline]
    pub fn snapshot(&self) -> DirectionFlags {
        DirectionFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    /// Set or clear the flag driven by `key`; returns the new flag set.
    pub fn set_key(&self, key: Key, pressed: bool) -> DirectionFlags {
        let bit = key.flag().bits();
        let before = if pressed {
            self.flags.fetch_or(bit, Ordering::AcqRel)
        } else {
            self.flags.fetch_and(!bit, Ordering::AcqRel)
        };
        let after = if pressed { before | bit } else { before & !bit };
        DirectionFlags::from_bits_truncate(after)
    }

    /// Replace the whole flag set.
    pub fn override_flags(&self, flags: DirectionFlags) {
        self.flags.store(flags.bits(), Ordering::Release);
    }

    /// Release every key.
    pub fn clear_flags(&self) {
        self.override_flags(DirectionFlags::empty());
    }

    /// Apply one decoded event.
    pub fn apply(&self, event: ControlEvent) -> Applied {
        match event {
            ControlEvent::Key(ev) => Applied::Updated(self.set_key(ev.key, ev.pressed)),
            ControlEvent::Command(cmd) => {
                let flags = cmd.flags();
                self.override_flags(flags);
                Applied::Updated(flags)
            }
            ControlEvent::Exit => {
                self.request_shutdown();
                Applied::Exit
            }
            ControlEvent::Unrecognized => Applied::Ignored,
        }
    }

    // ─── Previous command ───────────────────────────────────────────

    /// Command currently believed active on the actuator.
    #[inline]
    pub fn previous(&self) -> MotionCommand {
        MotionCommand::from_u8(self.previous.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Publish the engine's previous command. Engine only.
    pub(crate) fn record_previous(&self, command: MotionCommand) {
        self.previous.store(command as u8, Ordering::Release);
    }

    // ─── Shutdown ───────────────────────────────────────────────────

    /// Raise the shutdown flag. Returns `true` for the first caller only.
    pub fn request_shutdown(&self) -> bool {
        !self.shutdown.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
