//! # RoboDrive HAL Library
//!
//! Actuation backends for the RoboDrive controller. Every backend
//! implements the `Actuator` trait defined in `robodrive_common::actuator`,
//! so the arbitration core never learns which one is wired in.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Named actuator factories
//! - [`drivers`] - Backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    robodrive_hal                             │
//! │  ┌──────────────────┐        ┌────────────────────────────┐  │
//! │  │ DriverRegistry   │──────► │ Box<dyn Actuator>          │  │
//! │  │ "simulation"     │        │  SimulationActuator        │  │
//! │  │ "sim-pins"       │        │  PinActuator<P: OutputPin> │  │
//! │  └──────────────────┘        └────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod driver_registry;
pub mod drivers;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::pins::{PinActuator, SimPin, SimPinBank};
pub use crate::drivers::simulation::{Journal, SimulationActuator};
