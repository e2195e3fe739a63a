//! Prelude module for common re-exports.
//!
//! ```rust
//! use robodrive_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Actuation ──────────────────────────────────────────────────────
pub use crate::actuator::{
    Actuator, ActuatorConfig, ActuatorError, ActuatorFactory, PinAssignment,
};

// ─── Control vocabulary ─────────────────────────────────────────────
pub use crate::control::{
    ControlEvent, DirectionFlags, DriveCommand, FlagsView, Key, KeyEvent, MotionCommand,
};

// ─── Defaults ───────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_INTERVAL_US, SERVICE_NAME};
