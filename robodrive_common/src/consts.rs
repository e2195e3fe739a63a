//! Workspace-wide defaults.
//!
//! Values here are the fallbacks used when a configuration file omits
//! the corresponding key.

/// Canonical service name (used for logging).
pub const SERVICE_NAME: &str = "robodrive";

/// Default arbitration tick interval in microseconds.
pub const DEFAULT_CYCLE_INTERVAL_US: u64 = 1000;

/// Lower bound accepted for `cycle_interval_us`.
pub const MIN_CYCLE_INTERVAL_US: u64 = 100;

/// Upper bound accepted for `cycle_interval_us`.
pub const MAX_CYCLE_INTERVAL_US: u64 = 1_000_000;

/// Default listen address of the plain-text key transport.
pub const DEFAULT_TEXT_BIND: &str = "0.0.0.0:6678";

/// Default listen address of the WebSocket JSON transport.
pub const DEFAULT_WS_BIND: &str = "0.0.0.0:8000";

/// How often blocked transport threads re-check the shutdown flag.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Longest text-transport message kept; longer input is discarded.
pub const MAX_LINE_BYTES: usize = 1024;

/// Default board pin numbers of the raw H-bridge wiring
/// (left forward, left backward, right forward, right backward).
pub const DEFAULT_PINS: [u8; 4] = [35, 37, 36, 38];
