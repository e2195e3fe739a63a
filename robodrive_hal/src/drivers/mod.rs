//! Actuator backend implementations.
//!
//! - [`simulation`] - Motor-abstraction backend that journals every call
//! - [`pins`] - Raw four-pin H-bridge backend over `embedded-hal` output pins
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `Actuator` from `robodrive_common::actuator`
//! 3. Register its factory in [`register_all_drivers`]

pub mod pins;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every built-in backend into `registry`.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
    registry.register("sim-pins", pins::create_sim_driver);
}
