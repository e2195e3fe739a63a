//! Controller error type.

use robodrive_common::actuator::ActuatorError;
use robodrive_common::config::ConfigError;
use robodrive_common::control::MotionCommand;
use thiserror::Error;

/// Errors that end a controller component.
///
/// Malformed wire messages and peer disconnects are not errors at this
/// level; transports recover from them locally.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The actuator backend could not be created.
    #[error("actuator setup failed: {0}")]
    Setup(#[from] ActuatorError),

    /// An actuator call failed inside the arbitration loop (fatal).
    #[error("actuator failed while issuing '{command}': {source}")]
    Actuator {
        command: MotionCommand,
        #[source]
        source: ActuatorError,
    },

    /// Socket or thread I/O failure outside a client session.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("worker thread '{0}' panicked")]
    WorkerPanicked(&'static str),

    /// Installing the Ctrl-C handler failed.
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl ControlError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
