//! RoboDrive Common Library
//!
//! Shared vocabulary for every RoboDrive workspace crate: the direction
//! flag set, the motion command enum, the actuator capability trait and
//! TOML configuration loading.
//!
//! # Module Structure
//!
//! - [`control`] - Direction flags, keys, drive commands, motion commands
//! - [`actuator`] - `Actuator` trait, `ActuatorError`, backend configuration
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use robodrive_common::prelude::*;
//!
//! let flags = DirectionFlags::FORWARD | DirectionFlags::LEFT;
//! assert!(flags.contains(Key::W.flag()));
//! assert_eq!(MotionCommand::default(), MotionCommand::None);
//! ```

pub mod actuator;
pub mod config;
pub mod consts;
pub mod control;
pub mod prelude;
