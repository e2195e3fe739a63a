//! Simulation backend.
//!
//! Stands in for a motor-pair abstraction on machines without motor
//! hardware. Every call is appended to a shared [`Journal`] so tests and
//! diagnostics can count exactly what the controller issued.

use parking_lot::Mutex;
use robodrive_common::actuator::{Actuator, ActuatorConfig, ActuatorError};
use robodrive_common::control::MotionCommand;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared, append-only log of issued motion commands.
pub type Journal = Arc<Mutex<Vec<MotionCommand>>>;

/// Simulation backend implementing `Actuator`.
pub struct SimulationActuator {
    journal: Journal,
    /// Last command applied (for change-only logging)
    last: MotionCommand,
    released: bool,
}

impl SimulationActuator {
    /// Create a backend with its own empty journal.
    pub fn new() -> Self {
        Self::with_journal(Arc::new(Mutex::new(Vec::new())))
    }

    /// Create a backend that appends to an existing journal.
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            last: MotionCommand::None,
            released: false,
        }
    }

    /// Handle to the journal.
    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    fn record(&mut self, command: MotionCommand) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released("simulation"));
        }
        self.journal.lock().push(command);
        if command != self.last {
            info!("[SIM] {}", command);
            self.last = command;
        } else {
            debug!("[SIM] {} (repeat)", command);
        }
        Ok(())
    }
}

impl Default for SimulationActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for SimulationActuator {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn forward(&mut self) -> Result<(), ActuatorError> {
        self.record(MotionCommand::Forward)
    }

    fn backward(&mut self) -> Result<(), ActuatorError> {
        self.record(MotionCommand::Backward)
    }

    fn left(&mut self) -> Result<(), ActuatorError> {
        self.record(MotionCommand::Left)
    }

    fn right(&mut self) -> Result<(), ActuatorError> {
        self.record(MotionCommand::Right)
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.record(MotionCommand::None)
    }

    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        info!("Shutting down simulation backend");
        self.released = true;
        Ok(())
    }
}

/// Factory function registered as `"simulation"`.
pub fn create_driver(_config: &ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError> {
    Ok(Box::new(SimulationActuator::new()))
}
