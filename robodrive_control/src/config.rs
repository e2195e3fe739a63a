//! Controller configuration (`robodrive.toml`).
//!
//! Every section is optional. A missing `[transport]` table enables both
//! transports on their default binds; inside a present `[transport]`
//! table a transport runs only if its bind address is given.

use std::path::Path;
use std::time::Duration;

use robodrive_common::actuator::ActuatorConfig;
use robodrive_common::config::{ConfigError, ConfigLoader, SharedConfig};
use robodrive_common::consts::{
    DEFAULT_CYCLE_INTERVAL_US, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TEXT_BIND, DEFAULT_WS_BIND,
    MAX_CYCLE_INTERVAL_US, MIN_CYCLE_INTERVAL_US,
};
use serde::Deserialize;

use crate::command::arbitration::ArbitrationPolicy;

// ─── Sections ───────────────────────────────────────────────────────

/// `[arbitration]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArbitrationConfig {
    #[serde(default)]
    pub policy: ArbitrationPolicy,
    /// Tick period of the arbitration loop.
    #[serde(default = "default_cycle_interval_us")]
    pub cycle_interval_us: u64,
}

impl ArbitrationConfig {
    pub const fn cycle_interval(&self) -> Duration {
        Duration::from_micros(self.cycle_interval_us)
    }
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            policy: ArbitrationPolicy::default(),
            cycle_interval_us: DEFAULT_CYCLE_INTERVAL_US,
        }
    }
}

/// `[transport]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Plain-text key protocol listener. `None` disables it.
    #[serde(default)]
    pub text_bind: Option<String>,
    /// WebSocket JSON listener. `None` disables it.
    #[serde(default)]
    pub ws_bind: Option<String>,
    /// How often blocked accept/read calls re-check the shutdown flag.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Clear all flags when a WebSocket client disconnects.
    #[serde(default)]
    pub release_on_disconnect: bool,
}

impl TransportConfig {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            text_bind: Some(DEFAULT_TEXT_BIND.to_string()),
            ws_bind: Some(DEFAULT_WS_BIND.to_string()),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            release_on_disconnect: false,
        }
    }
}

fn default_cycle_interval_us() -> u64 {
    DEFAULT_CYCLE_INTERVAL_US
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

// ─── Root ───────────────────────────────────────────────────────────

/// Complete controller configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub arbitration: ArbitrationConfig,
    #[serde(default)]
    pub actuator: ActuatorConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

impl ControllerConfig {
    /// Semantic checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let interval = self.arbitration.cycle_interval_us;
        if !(MIN_CYCLE_INTERVAL_US..=MAX_CYCLE_INTERVAL_US).contains(&interval) {
            return Err(ConfigError::ValidationError(format!(
                "arbitration.cycle_interval_us = {interval} outside \
                 [{MIN_CYCLE_INTERVAL_US}, {MAX_CYCLE_INTERVAL_US}]"
            )));
        }

        let transport = &self.transport;
        if transport.text_bind.is_none() && transport.ws_bind.is_none() {
            return Err(ConfigError::ValidationError(
                "no transport enabled: set transport.text_bind or transport.ws_bind".into(),
            ));
        }
        for (key, bind) in [
            ("text_bind", &transport.text_bind),
            ("ws_bind", &transport.ws_bind),
        ] {
            if bind.as_deref().is_some_and(|b| b.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "transport.{key} must not be empty"
                )));
            }
        }
        if transport.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "transport.poll_interval_ms must be > 0".into(),
            ));
        }

        self.actuator
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("actuator: {e}")))
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate an in-memory configuration.
pub fn load_config_from_str(content: &str) -> Result<ControllerConfig, ConfigError> {
    let config = ControllerConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = load_config_from_str("").unwrap();
        assert_eq!(cfg.arbitration, ArbitrationConfig::default());
        assert_eq!(cfg.arbitration.cycle_interval(), Duration::from_millis(1));
        assert_eq!(cfg.transport.text_bind.as_deref(), Some(DEFAULT_TEXT_BIND));
        assert_eq!(cfg.transport.ws_bind.as_deref(), Some(DEFAULT_WS_BIND));
        assert!(!cfg.transport.release_on_disconnect);
        assert_eq!(cfg.actuator.driver, "simulation");
    }

    #[test]
    fn transport_table_enables_only_listed_binds() {
        let cfg = load_config_from_str(
            r#"
            [transport]
            text_bind = "127.0.0.1:7000"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.transport.text_bind.as_deref(), Some("127.0.0.1:7000"));
        assert_eq!(cfg.transport.ws_bind, None);
        assert_eq!(cfg.transport.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn empty_transport_table_is_rejected() {
        let err = load_config_from_str("[transport]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("no transport")));
    }

    #[test]
    fn policy_parses_snake_case() {
        let cfg = load_config_from_str(
            r#"
            [arbitration]
            policy = "priority_fallback"
            cycle_interval_us = 500
            "#,
        )
        .unwrap();
        assert_eq!(cfg.arbitration.policy, ArbitrationPolicy::PriorityFallback);
        assert_eq!(cfg.arbitration.cycle_interval(), Duration::from_micros(500));
    }

    #[test]
    fn cycle_interval_bounds_are_enforced() {
        for bad in [0, MIN_CYCLE_INTERVAL_US - 1, MAX_CYCLE_INTERVAL_US + 1] {
            let toml = format!("[arbitration]\ncycle_interval_us = {bad}\n");
            assert!(
                matches!(load_config_from_str(&toml), Err(ConfigError::ValidationError(_))),
                "interval {bad} accepted"
            );
        }
    }

    #[test]
    fn blank_bind_and_zero_poll_are_rejected() {
        assert!(load_config_from_str("[transport]\nws_bind = \" \"\n").is_err());
        assert!(
            load_config_from_str("[transport]\nws_bind = \"127.0.0.1:0\"\npoll_interval_ms = 0\n")
                .is_err()
        );
    }

    #[test]
    fn duplicate_pins_fail_validation() {
        let err = load_config_from_str(
            r#"
            [actuator]
            driver = "sim-pins"
            pins = { left_forward = 1, left_backward = 1, right_forward = 2, right_backward = 3 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.starts_with("actuator")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            load_config_from_str("[arbitration]\nspeed = 3\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            load_config_from_str("[bogus]\n"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
