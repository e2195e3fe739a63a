//! Arbitration cycle: snapshot → decide → actuate.
//!
//! The engine owns the actuator. Each tick takes one consistent flag
//! snapshot, asks [`decide`] for the next step and calls the actuator
//! only when a command is issued. Shutdown is terminal: the first tick
//! that sees the shutdown flag calls `stop()` once, releases the backend
//! and every later tick is a no-op.
//!
//! ## Loop pacing
//! `std::thread::sleep` for the remainder of the interval. A tick that
//! overruns the interval is counted, not fatal; the only fatal condition
//! is an actuator failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use robodrive_common::actuator::Actuator;
use robodrive_common::control::MotionCommand;
use tracing::{debug, error, info, warn};

use crate::command::arbitration::{ArbitrationPolicy, Decision, Reason, decide};
use crate::error::ControlError;
use crate::state::ControlState;

/// Emit a stats line every this many ticks (debug level).
const STATS_LOG_EVERY: u64 = 10_000;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-tick timing and decision counters. O(1) update, no allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u64,
    /// Ticks that took longer than the interval.
    pub overruns: u64,
    /// Ticks that issued a command.
    pub issued: u64,
    /// Ticks that held.
    pub held: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            issued: 0,
            held: 0,
        }
    }

    /// Record one tick duration.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Engine ─────────────────────────────────────────────────────────

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No command issued; actuator untouched.
    Held,
    /// `command` was sent to the actuator.
    Issued(MotionCommand),
    /// Engine has stopped the actuator and will not call it again.
    Terminated,
}

/// Arbitration engine. Sole caller of the actuator.
pub struct ArbitrationEngine {
    state: Arc<ControlState>,
    actuator: Box<dyn Actuator>,
    policy: ArbitrationPolicy,
    previous: MotionCommand,
    terminated: bool,
    stats: CycleStats,
}

impl ArbitrationEngine {
    pub fn new(
        state: Arc<ControlState>,
        actuator: Box<dyn Actuator>,
        policy: ArbitrationPolicy,
    ) -> Self {
        let previous = state.previous();
        Self {
            state,
            actuator,
            policy,
            previous,
            terminated: false,
            stats: CycleStats::new(),
        }
    }

    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    pub fn previous(&self) -> MotionCommand {
        self.previous
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Evaluate one step.
    ///
    /// # Errors
    /// `ControlError::Actuator` when the actuator rejects a command. The
    /// engine has already attempted a `stop()` and is terminated.
    pub fn tick(&mut self) -> Result<TickOutcome, ControlError> {
        if self.terminated {
            return Ok(TickOutcome::Terminated);
        }
        if self.state.is_shutdown() {
            self.terminate()?;
            return Ok(TickOutcome::Terminated);
        }

        let flags = self.state.snapshot();
        match decide(self.policy, flags, self.previous) {
            Decision::Hold => {
                self.stats.held += 1;
                Ok(TickOutcome::Held)
            }
            Decision::Issue { command, reason } => {
                match reason {
                    Reason::Rule(n) => {
                        debug!(rule = n, ?flags, from = %self.previous, to = %command, "issue")
                    }
                    Reason::Fallback => {
                        debug!(?flags, from = %self.previous, to = %command, "issue (fallback)")
                    }
                }
                if let Err(source) = self.actuator.apply(command) {
                    error!(%command, error = %source, "actuator failed; stopping");
                    self.fail_safe();
                    return Err(ControlError::Actuator { command, source });
                }
                self.set_previous(command);
                self.stats.issued += 1;
                Ok(TickOutcome::Issued(command))
            }
        }
    }

    /// Run ticks every `interval` until terminated.
    ///
    /// Returns the final statistics on clean shutdown.
    pub fn run(&mut self, interval: Duration) -> Result<CycleStats, ControlError> {
        info!(
            policy = %self.policy,
            interval_us = interval.as_micros() as u64,
            actuator = self.actuator.name(),
            "arbitration loop started"
        );

        loop {
            let start = Instant::now();
            let outcome = self.tick()?;
            let elapsed = start.elapsed();
            self.stats.record(elapsed.as_nanos() as u64);

            if outcome == TickOutcome::Terminated {
                break;
            }
            if elapsed > interval {
                self.stats.overruns += 1;
            }
            if self.stats.cycle_count % STATS_LOG_EVERY == 0 {
                debug!(
                    ticks = self.stats.cycle_count,
                    avg_ns = self.stats.avg_cycle_ns(),
                    max_ns = self.stats.max_cycle_ns,
                    overruns = self.stats.overruns,
                    issued = self.stats.issued,
                    "arbitration stats"
                );
            }
            if let Some(remaining) = interval.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }

        info!(
            ticks = self.stats.cycle_count,
            issued = self.stats.issued,
            overruns = self.stats.overruns,
            "arbitration loop stopped"
        );
        Ok(self.stats.clone())
    }

    // ─── Internal ───────────────────────────────────────────────────

    fn set_previous(&mut self, command: MotionCommand) {
        self.previous = command;
        self.state.record_previous(command);
    }

    /// Orderly shutdown: one `stop()`, then release the backend.
    fn terminate(&mut self) -> Result<(), ControlError> {
        self.terminated = true;
        info!(from = %self.previous, "shutdown requested; stopping actuator");
        let stopped = self.actuator.stop();
        self.set_previous(MotionCommand::None);
        if let Err(e) = self.actuator.shutdown() {
            warn!(error = %e, "actuator release failed");
        }
        stopped.map_err(|source| ControlError::Actuator {
            command: MotionCommand::None,
            source,
        })
    }

    /// Best-effort stop after a failed actuator call.
    fn fail_safe(&mut self) {
        self.terminated = true;
        if let Err(e) = self.actuator.stop() {
            error!(error = %e, "best-effort stop failed");
        }
        self.set_previous(MotionCommand::None);
        if let Err(e) = self.actuator.shutdown() {
            warn!(error = %e, "actuator release failed");
        }
        // Nobody can drive anymore; let the rest of the process wind down.
        self.state.request_shutdown();
    }
}

impl std::fmt::Debug for ArbitrationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbitrationEngine")
            .field("actuator", &self.actuator.name())
            .field("policy", &self.policy)
            .field("previous", &self.previous)
            .field("terminated", &self.terminated)
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
