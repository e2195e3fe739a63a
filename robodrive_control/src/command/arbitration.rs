//! Flag arbitration: `(flags, previous) -> decision`.
//!
//! The transition table is a priority list evaluated top to bottom; the
//! first rule whose flag pattern equals the snapshot and whose previous
//! command condition holds wins. No match means hold: the actuator keeps
//! doing whatever it was last told.
//!
//! | #  | f | b | l | r | prev      | issue    |
//! |----|---|---|---|---|-----------|----------|
//! | 1  | 0 | 0 | 0 | 0 | ≠None     | None     |
//! | 2  | 1 | 1 | 1 | 1 | ≠None     | None     |
//! | 3  | 0 | 0 | 1 | 1 | ≠None     | None     |
//! | 4  | 1 | 1 | 0 | 0 | ≠None     | None     |
//! | 5  | 1 | 0 | 0 | 0 | ≠Forward  | Forward  |
//! | 6  | 1 | 0 | 1 | 0 | =Left     | Forward  |
//! | 7  | 1 | 0 | 0 | 1 | =Right    | Forward  |
//! | 8  | 1 | 0 | 1 | 1 | ≠Forward  | Forward  |
//! | 9  | 0 | 1 | 0 | 0 | ≠Backward | Backward |
//! | 10 | 0 | 1 | 1 | 0 | =Left     | Backward |
//! | 11 | 0 | 1 | 0 | 1 | =Right    | Backward |
//! | 12 | 0 | 1 | 1 | 1 | ≠Backward | Backward |
//! | 13 | 0 | 0 | 1 | 0 | ≠Left     | Left     |
//! | 14 | 1 | 1 | 1 | 0 | ≠Left     | Left     |
//! | 15 | 0 | 0 | 0 | 1 | ≠Right    | Right    |
//! | 16 | 1 | 1 | 0 | 1 | ≠Right    | Right    |
//!
//! Two policies are offered. [`ArbitrationPolicy::Table`] is the table
//! exactly, gaps included (e.g. forward+left arriving from Backward holds
//! Backward). [`ArbitrationPolicy::PriorityFallback`] resolves the gaps
//! with forward > backward > left > right over unopposed flags.

use robodrive_common::control::{DirectionFlags, MotionCommand};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use self::PrevCondition::{Is, Not};
use robodrive_common::control::MotionCommand as M;

/// Condition a rule places on the previous command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevCondition {
    /// Previous command must differ from this one.
    Not(MotionCommand),
    /// Previous command must equal this one.
    Is(MotionCommand),
}

impl PrevCondition {
    #[inline]
    pub const fn holds(self, prev: MotionCommand) -> bool {
        match self {
            Self::Not(cmd) => cmd as u8 != prev as u8,
            Self::Is(cmd) => cmd as u8 == prev as u8,
        }
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// 1-based row number, for logs.
    pub number: u8,
    /// Exact flag pattern the snapshot must equal.
    pub flags: DirectionFlags,
    pub prev: PrevCondition,
    /// Command issued when the rule fires.
    pub command: MotionCommand,
}

const fn rule(
    number: u8,
    [f, b, l, r]: [u8; 4],
    prev: PrevCondition,
    command: MotionCommand,
) -> Rule {
    Rule {
        number,
        flags: DirectionFlags::from_bools(f == 1, b == 1, l == 1, r == 1),
        prev,
        command,
    }
}

/// Priority-ordered transition table.
pub static TRANSITION_TABLE: [Rule; 16] = [
    // all-cancel combinations force a stop
    rule(1, [0, 0, 0, 0], Not(M::None), M::None),
    rule(2, [1, 1, 1, 1], Not(M::None), M::None),
    rule(3, [0, 0, 1, 1], Not(M::None), M::None),
    rule(4, [1, 1, 0, 0], Not(M::None), M::None),
    // forward
    rule(5, [1, 0, 0, 0], Not(M::Forward), M::Forward),
    rule(6, [1, 0, 1, 0], Is(M::Left), M::Forward),
    rule(7, [1, 0, 0, 1], Is(M::Right), M::Forward),
    rule(8, [1, 0, 1, 1], Not(M::Forward), M::Forward),
    // backward
    rule(9, [0, 1, 0, 0], Not(M::Backward), M::Backward),
    rule(10, [0, 1, 1, 0], Is(M::Left), M::Backward),
    rule(11, [0, 1, 0, 1], Is(M::Right), M::Backward),
    rule(12, [0, 1, 1, 1], Not(M::Backward), M::Backward),
    // turns
    rule(13, [0, 0, 1, 0], Not(M::Left), M::Left),
    rule(14, [1, 1, 1, 0], Not(M::Left), M::Left),
    rule(15, [0, 0, 0, 1], Not(M::Right), M::Right),
    rule(16, [1, 1, 0, 1], Not(M::Right), M::Right),
];

/// How unmatched `(flags, prev)` combinations are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationPolicy {
    /// Table only; unmatched combinations hold the previous command.
    #[default]
    Table,
    /// Table first; unmatched combinations fall back to
    /// forward > backward > left > right over unopposed flags.
    PriorityFallback,
}

impl ArbitrationPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::PriorityFallback => "priority_fallback",
        }
    }
}

impl fmt::Display for ArbitrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArbitrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "priority_fallback" => Ok(Self::PriorityFallback),
            other => Err(format!(
                "unknown arbitration policy '{other}' (expected 'table' or 'priority_fallback')"
            )),
        }
    }
}

/// Why a command was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Transition table row (1-based).
    Rule(u8),
    /// Priority fallback for a combination the table leaves open.
    Fallback,
}

/// Outcome of one arbitration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the actuator and previous command alone.
    Hold,
    /// Issue `command` to the actuator.
    Issue { command: MotionCommand, reason: Reason },
}

impl Decision {
    /// Command to issue, if any.
    pub const fn command(self) -> Option<MotionCommand> {
        match self {
            Self::Hold => None,
            Self::Issue { command, .. } => Some(command),
        }
    }
}

/// First table rule matching `(flags, prev)`.
pub fn match_rule(flags: DirectionFlags, prev: MotionCommand) -> Option<&'static Rule> {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.flags == flags && rule.prev.holds(prev))
}

/// Command preferred by the fallback priority, ignoring the previous command.
///
/// Opposing pairs (forward+backward, left+right) cancel each other.
pub const fn fallback_command(flags: DirectionFlags) -> MotionCommand {
    let f = flags.contains(DirectionFlags::FORWARD);
    let b = flags.contains(DirectionFlags::BACKWARD);
    let l = flags.contains(DirectionFlags::LEFT);
    let r = flags.contains(DirectionFlags::RIGHT);
    if f && !b {
        MotionCommand::Forward
    } else if b && !f {
        MotionCommand::Backward
    } else if l && !r {
        MotionCommand::Left
    } else if r && !l {
        MotionCommand::Right
    } else {
        MotionCommand::None
    }
}

/// Decide the next step. Pure; never issues a command equal to `prev`.
pub fn decide(policy: ArbitrationPolicy, flags: DirectionFlags, prev: MotionCommand) -> Decision {
    if let Some(rule) = match_rule(flags, prev) {
        return Decision::Issue {
            command: rule.command,
            reason: Reason::Rule(rule.number),
        };
    }
    match policy {
        ArbitrationPolicy::Table => Decision::Hold,
        ArbitrationPolicy::PriorityFallback => {
            let preferred = fallback_command(flags);
            if preferred == prev {
                Decision::Hold
            } else {
                Decision::Issue {
                    command: preferred,
                    reason: Reason::Fallback,
                }
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
