//! Driver registry for actuation backends.
//!
//! Maps driver names from `[actuator] driver = "..."` to factory
//! functions. Built at startup and passed by value; no global state.

use robodrive_common::actuator::{Actuator, ActuatorConfig, ActuatorError, ActuatorFactory};
use std::collections::HashMap;
use tracing::info;

use crate::drivers::register_all_drivers;

/// Registry of available actuator backends.
pub struct DriverRegistry {
    factories: HashMap<&'static str, ActuatorFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in backend.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        register_all_drivers(&mut reg);
        reg
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: ActuatorFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<ActuatorFactory> {
        self.factories.get(name).copied()
    }

    /// Validate `config` and build the backend it names.
    ///
    /// # Errors
    /// - `ActuatorError::ConfigError` if the configuration is invalid
    /// - `ActuatorError::DriverNotFound` if no driver with that name is registered
    /// - whatever the factory itself reports
    pub fn create(&self, config: &ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError> {
        config.validate()?;
        let factory = self
            .get_factory(&config.driver)
            .ok_or_else(|| ActuatorError::DriverNotFound(config.driver.clone()))?;
        let actuator = factory(config)?;
        info!("Created actuator backend '{}'", actuator.name());
        Ok(actuator)
    }

    /// List all registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
