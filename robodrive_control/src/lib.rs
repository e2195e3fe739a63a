//! # RoboDrive Control Library
//!
//! Remote drive controller for a differential-drive base. Transports
//! decode key press/release messages into four direction flags; an
//! independent arbitration loop turns the held flags plus the previously
//! issued command into the next motion command and hands it to the
//! actuator only when the transition table says so.
//!
//! ## Data Flow
//!
//! ```text
//! wire ──► transport ──► Demultiplexer ──► ControlState ◄── ArbitrationEngine ──► Actuator
//!           (text/ws)      (decode+apply)    (atomics)        (tick loop)
//! ```
//!
//! ## Roles
//!
//! - Transports (one thread each) write flags and the shutdown flag.
//! - The arbitration engine (own thread) reads a single-load flag
//!   snapshot per tick, owns the actuator and is the only writer of the
//!   previous command.

pub mod command;
pub mod config;
pub mod cycle;
pub mod error;
pub mod protocol;
pub mod shutdown;
pub mod state;
pub mod transport;
