//! Shutdown coordination.
//!
//! Every worker thread (arbitration engine, transports) is spawned through
//! the [`ShutdownCoordinator`]. Any of them ending with an error raises
//! the shared shutdown flag so the rest wind down too; `exit` on the text
//! transport and Ctrl-C raise the same flag. [`ShutdownCoordinator::wait`]
//! joins all workers and reports the first failure.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::error::ControlError;
use crate::state::ControlState;

type Worker = (&'static str, JoinHandle<Result<(), ControlError>>);

/// Raises shutdown if the owning worker unwinds.
struct PanicGuard(Arc<ControlState>);

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.request_shutdown();
        }
    }
}

/// Owns the worker threads of one controller instance.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    state: Arc<ControlState>,
    workers: Vec<Worker>,
}

impl ShutdownCoordinator {
    pub fn new(state: Arc<ControlState>) -> Self {
        Self {
            state,
            workers: Vec::new(),
        }
    }

    /// Route SIGINT/SIGTERM to the shutdown flag. Once per process.
    pub fn install_signal_handler(&self) -> Result<(), ControlError> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || {
            if state.request_shutdown() {
                info!("Received shutdown signal");
            }
        })?;
        Ok(())
    }

    /// Raise the shutdown flag. Returns `true` if this call raised it.
    pub fn request(&self, reason: &str) -> bool {
        let first = self.state.request_shutdown();
        if first {
            info!(reason, "shutdown requested");
        }
        first
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.is_shutdown()
    }

    /// Spawn a named worker. A worker returning `Err` requests shutdown.
    pub fn spawn<F>(&mut self, name: &'static str, work: F) -> Result<(), ControlError>
    where
        F: FnOnce() -> Result<(), ControlError> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _guard = PanicGuard(Arc::clone(&state));
                let result = work();
                if let Err(ref e) = result {
                    error!(worker = name, error = %e, "worker failed");
                    state.request_shutdown();
                }
                result
            })
            .map_err(|e| ControlError::io(format!("spawn {name}"), e))?;
        self.workers.push((name, handle));
        Ok(())
    }

    /// Join every worker. Returns the first error in spawn order.
    pub fn wait(self) -> Result<(), ControlError> {
        let mut first_err = None;
        for (name, handle) in self.workers {
            let outcome = match handle.join() {
                Ok(result) => result,
                Err(_) => {
                    self.state.request_shutdown();
                    Err(ControlError::WorkerPanicked(name))
                }
            };
            match outcome {
                Ok(()) => info!(worker = name, "worker stopped"),
                Err(e) if first_err.is_none() => first_err = Some(e),
                Err(e) => error!(worker = name, error = %e, "additional worker failure"),
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
