//! Raw H-bridge backend.
//!
//! Drives the two wheel sides through four digital outputs
//! (left forward, left backward, right forward, right backward). Every
//! motion first pulls all four low, then applies its level pattern, so a
//! side is never driven both ways at once.
//!
//! Generic over `embedded_hal::digital::OutputPin`; board support crates
//! hand in their GPIO pins via [`PinActuator::new`]. [`SimPinBank`]
//! provides in-memory pins for hosts without GPIO.

use embedded_hal::digital::{Error as _, ErrorType, OutputPin};
use robodrive_common::actuator::{Actuator, ActuatorConfig, ActuatorError, PinAssignment};
use robodrive_common::control::MotionCommand;
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Output levels (LF, LB, RF, RB) for each motion command.
pub const fn levels_for(command: MotionCommand) -> [bool; 4] {
    match command {
        MotionCommand::None => [false, false, false, false],
        MotionCommand::Forward => [true, false, true, false],
        MotionCommand::Backward => [false, true, false, true],
        MotionCommand::Left => [true, false, false, true],
        MotionCommand::Right => [false, true, true, false],
    }
}

/// Four-pin H-bridge backend implementing `Actuator`.
pub struct PinActuator<P: OutputPin> {
    /// Output pins in LF, LB, RF, RB order
    pins: [P; 4],
    /// Board numbers of `pins`, for error reporting
    numbers: [u8; 4],
    /// Last command driven onto the pins (for change-only logging)
    current: MotionCommand,
    released: bool,
}

impl<P: OutputPin> PinActuator<P> {
    /// Wrap four output pins wired as described by `assignment`.
    ///
    /// All pins are driven low before the backend is handed out.
    ///
    /// # Errors
    /// Returns `ActuatorError::PinWrite` if the initial clear fails.
    pub fn new(pins: [P; 4], assignment: PinAssignment) -> Result<Self, ActuatorError> {
        let mut actuator = Self {
            pins,
            numbers: assignment.as_array(),
            current: MotionCommand::None,
            released: false,
        };
        actuator.clear()?;
        info!(
            "Pin backend ready (LF={}, LB={}, RF={}, RB={})",
            assignment.left_forward,
            assignment.left_backward,
            assignment.right_forward,
            assignment.right_backward
        );
        Ok(actuator)
    }

    fn write(&mut self, idx: usize, high: bool) -> Result<(), ActuatorError> {
        let pin = &mut self.pins[idx];
        let result = if high { pin.set_high() } else { pin.set_low() };
        result.map_err(|e| ActuatorError::PinWrite {
            pin: self.numbers[idx],
            reason: format!("{:?}", e.kind()),
        })
    }

    fn clear(&mut self) -> Result<(), ActuatorError> {
        for idx in 0..self.pins.len() {
            self.write(idx, false)?;
        }
        Ok(())
    }

    fn drive(&mut self, command: MotionCommand) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released("pins"));
        }
        self.clear()?;
        let levels = levels_for(command);
        for (idx, high) in levels.into_iter().enumerate() {
            self.write(idx, high)?;
        }
        if command != self.current {
            info!("Pins -> {} {:?}", command, levels);
            self.current = command;
        } else {
            debug!("Pins -> {} (repeat)", command);
        }
        Ok(())
    }

    /// Command whose pattern is currently on the pins.
    pub fn current(&self) -> MotionCommand {
        self.current
    }
}

impl<P: OutputPin + Send> Actuator for PinActuator<P> {
    fn name(&self) -> &'static str {
        "pins"
    }

    fn forward(&mut self) -> Result<(), ActuatorError> {
        self.drive(MotionCommand::Forward)
    }

    fn backward(&mut self) -> Result<(), ActuatorError> {
        self.drive(MotionCommand::Backward)
    }

    fn left(&mut self) -> Result<(), ActuatorError> {
        self.drive(MotionCommand::Left)
    }

    fn right(&mut self) -> Result<(), ActuatorError> {
        self.drive(MotionCommand::Right)
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.drive(MotionCommand::None)
    }

    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Ok(());
        }
        info!("Releasing pin backend");
        let result = self.clear();
        self.current = MotionCommand::None;
        if let Err(ref e) = result {
            warn!("Failed to clear pins on shutdown: {e}");
        }
        self.released = true;
        result
    }
}

/// In-memory output pin; its level is visible through the owning [`SimPinBank`].
#[derive(Debug, Clone)]
pub struct SimPin {
    level: Arc<AtomicBool>,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.store(false, Ordering::Release);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.store(true, Ordering::Release);
        Ok(())
    }
}

/// Four simulated pins plus a read-only view of their levels.
#[derive(Debug, Clone, Default)]
pub struct SimPinBank {
    levels: [Arc<AtomicBool>; 4],
}

impl SimPinBank {
    /// Create a bank with all pins low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins to hand to [`PinActuator::new`].
    pub fn pins(&self) -> [SimPin; 4] {
        self.levels.clone().map(|level| SimPin { level })
    }

    /// Current levels (LF, LB, RF, RB).
    pub fn levels(&self) -> [bool; 4] {
        std::array::from_fn(|idx| self.levels[idx].load(Ordering::Acquire))
    }
}

/// Factory function registered as `"sim-pins"`.
pub fn create_sim_driver(config: &ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError> {
    let bank = SimPinBank::new();
    Ok(Box::new(PinActuator::new(bank.pins(), config.pins)?))
}
