//! Actuator trait and error types.
//!
//! This module defines:
//! - `Actuator` trait - the motion capability every backend provides
//! - `ActuatorError` enum - error types for actuation
//! - `ActuatorFactory` type alias - factory function type
//! - `ActuatorConfig` / `PinAssignment` - backend selection and wiring

use crate::consts::DEFAULT_PINS;
use crate::control::MotionCommand;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for actuation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Driver not registered
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Writing an output pin failed
    #[error("Pin {pin} write failed: {reason}")]
    PinWrite { pin: u8, reason: String },

    /// Backend was already released by `shutdown()`
    #[error("Actuator '{0}' already shut down")]
    Released(&'static str),
}

/// Factory function type for creating actuator instances.
pub type ActuatorFactory = fn(&ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError>;

/// Motion primitives of a differential-drive base.
///
/// The arbitration core only ever talks to this trait, so it cannot tell
/// whether the wheels are driven through raw H-bridge pins or a motor
/// abstraction. Calls are assumed safe to repeat with the same command.
///
/// # Lifecycle
///
/// 1. Created by a factory from `ActuatorConfig`
/// 2. Motion calls from the arbitration loop
/// 3. `shutdown()` once, after the final `stop()`
pub trait Actuator: Send {
    /// Backend identifier (e.g., "simulation", "pins").
    fn name(&self) -> &'static str;

    /// Drive both sides forward.
    fn forward(&mut self) -> Result<(), ActuatorError>;

    /// Drive both sides backward.
    fn backward(&mut self) -> Result<(), ActuatorError>;

    /// Turn left in place.
    fn left(&mut self) -> Result<(), ActuatorError>;

    /// Turn right in place.
    fn right(&mut self) -> Result<(), ActuatorError>;

    /// Remove drive from both sides.
    fn stop(&mut self) -> Result<(), ActuatorError>;

    /// Dispatch a motion command to the matching primitive.
    fn apply(&mut self, command: MotionCommand) -> Result<(), ActuatorError> {
        match command {
            MotionCommand::None => self.stop(),
            MotionCommand::Forward => self.forward(),
            MotionCommand::Backward => self.backward(),
            MotionCommand::Left => self.left(),
            MotionCommand::Right => self.right(),
        }
    }

    /// Release the hardware.
    /// Default: no-op
    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }
}

/// Board pin numbers of a four-wire H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinAssignment {
    pub left_forward: u8,
    pub left_backward: u8,
    pub right_forward: u8,
    pub right_backward: u8,
}

impl PinAssignment {
    /// Pins in driver order (LF, LB, RF, RB).
    pub const fn as_array(&self) -> [u8; 4] {
        [
            self.left_forward,
            self.left_backward,
            self.right_forward,
            self.right_backward,
        ]
    }

    /// Reject wiring that reuses a pin.
    pub fn validate(&self) -> Result<(), ActuatorError> {
        let pins = self.as_array();
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(ActuatorError::ConfigError(format!(
                    "pin {a} assigned more than once"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PinAssignment {
    fn default() -> Self {
        let [left_forward, left_backward, right_forward, right_backward] = DEFAULT_PINS;
        Self {
            left_forward,
            left_backward,
            right_forward,
            right_backward,
        }
    }
}

/// Backend selection.
///
/// # TOML Example
///
/// ```toml
/// [actuator]
/// driver = "sim-pins"
///
/// [actuator.pins]
/// left_forward = 35
/// left_backward = 37
/// right_forward = 36
/// right_backward = 38
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Registered driver name.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Wiring used by pin-level drivers.
    #[serde(default)]
    pub pins: PinAssignment,
}

fn default_driver() -> String {
    "simulation".to_string()
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            pins: PinAssignment::default(),
        }
    }
}

impl ActuatorConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ActuatorError::ConfigError` if:
    /// - `driver` is empty
    /// - a pin number is used twice
    pub fn validate(&self) -> Result<(), ActuatorError> {
        if self.driver.is_empty() {
            return Err(ActuatorError::ConfigError(
                "driver cannot be empty".to_string(),
            ));
        }
        self.pins.validate()
    }
}
