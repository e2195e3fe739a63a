//! Network transports.
//!
//! - [`text`] - TCP, newline-delimited text key protocol
//! - [`ws`] - WebSocket, JSON protocol
//!
//! Each transport runs on its own thread and services one connection at
//! a time. Listeners are non-blocking and sockets carry a read timeout so
//! both loops notice the shutdown flag within one poll interval. A
//! dropped connection never touches the flags; the next client resumes
//! from the current state.

pub mod text;
pub mod ws;

pub use text::TextServer;
pub use ws::WsServer;

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use crate::error::ControlError;
use crate::state::ControlState;

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Peer closed the connection (EOF, reset or close frame).
    PeerClosed,
    /// Client sent `exit`.
    Exit,
    /// Shutdown was requested elsewhere.
    Shutdown,
}

pub(crate) fn bind_listener(addr: &str) -> Result<TcpListener, ControlError> {
    let listener =
        TcpListener::bind(addr).map_err(|e| ControlError::io(format!("bind {addr}"), e))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| ControlError::io(format!("set_nonblocking {addr}"), e))?;
    Ok(listener)
}

/// Wait for the next client. `None` once shutdown is requested.
pub(crate) fn accept_next(
    listener: &TcpListener,
    state: &ControlState,
    poll: Duration,
) -> Result<Option<(TcpStream, SocketAddr)>, ControlError> {
    loop {
        if state.is_shutdown() {
            return Ok(None);
        }
        match listener.accept() {
            Ok(conn) => return Ok(Some(conn)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => std::thread::sleep(poll),
            Err(e) if is_transient(&e) => continue,
            Err(e) => return Err(ControlError::io("accept failed", e)),
        }
    }
}

/// Prepare an accepted socket for a blocking session with a poll timeout.
pub(crate) fn configure_stream(stream: &TcpStream, poll: Duration) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(poll))?;
    stream.set_nodelay(true)
}

/// Read timed out; the caller should re-check shutdown and read again.
pub(crate) fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

/// Peer went away abruptly.
pub(crate) fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}
