//! TCP text transport.
//!
//! Messages look like `'w' press`. A newline ends a message, and so does a
//! quiet gap of one poll interval, so clients that send one bare message
//! per write work as well. Trailing `\r` and surrounding whitespace are
//! ignored. A partial message left when the peer closes is still
//! processed. Messages longer than [`MAX_LINE_BYTES`] are dropped up to
//! the next newline or gap. `exit` raises shutdown, closes the connection
//! and stops the accept loop.

use std::io::{self, BufRead, BufReader, Read};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use robodrive_common::consts::MAX_LINE_BYTES;
use tracing::{info, warn};

use super::{SessionEnd, accept_next, bind_listener, configure_stream, is_disconnect, is_timeout};
use crate::error::ControlError;
use crate::protocol::{Demultiplexer, WireFormat};
use crate::state::{Applied, ControlState};

/// Single-client TCP server for the text key protocol.
#[derive(Debug)]
pub struct TextServer {
    listener: TcpListener,
    demux: Demultiplexer,
    poll: Duration,
}

impl TextServer {
    /// Bind the listener. Nothing is accepted until [`serve`](Self::serve).
    pub fn bind(addr: &str, state: Arc<ControlState>, poll: Duration) -> Result<Self, ControlError> {
        Ok(Self {
            listener: bind_listener(addr)?,
            demux: Demultiplexer::new(state),
            poll,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ControlError> {
        self.listener
            .local_addr()
            .map_err(|e| ControlError::io("text listener address", e))
    }

    /// Accept and serve clients until shutdown.
    pub fn serve(self) -> Result<(), ControlError> {
        info!(addr = %self.local_addr()?, "text transport listening");
        let state = Arc::clone(self.demux.state());

        while let Some((stream, peer)) = accept_next(&self.listener, &state, self.poll)? {
            info!(%peer, "text client connected");
            match self.session(stream) {
                Ok(SessionEnd::PeerClosed) => info!(%peer, "text client disconnected"),
                Ok(SessionEnd::Exit) => info!(%peer, "text client requested exit"),
                Ok(SessionEnd::Shutdown) => info!(%peer, "closing text client for shutdown"),
                Err(e) if is_disconnect(&e) => info!(%peer, error = %e, "text client dropped"),
                Err(e) => warn!(%peer, error = %e, "text session failed; accepting next client"),
            }
        }

        info!("text transport stopped");
        Ok(())
    }

    fn session(&self, stream: TcpStream) -> io::Result<SessionEnd> {
        configure_stream(&stream, self.poll)?;
        let mut reader = BufReader::new(&stream);
        let mut line = Vec::new();
        // Set while dropping the rest of an over-long message.
        let mut discarding = false;

        loop {
            if self.demux.state().is_shutdown() {
                let _ = stream.shutdown(Shutdown::Both);
                return Ok(SessionEnd::Shutdown);
            }
            let budget = (MAX_LINE_BYTES + 1).saturating_sub(line.len()) as u64;
            // On timeout read_until keeps the bytes read so far in `line`.
            match reader.by_ref().take(budget).read_until(b'\n', &mut line) {
                Ok(0) => {
                    if !discarding && self.dispatch(&line) == Applied::Exit {
                        return Ok(SessionEnd::Exit);
                    }
                    return Ok(SessionEnd::PeerClosed);
                }
                Ok(_) if line.last() == Some(&b'\n') => {
                    if self.end_message(&mut line, &mut discarding) == Applied::Exit {
                        let _ = stream.shutdown(Shutdown::Both);
                        return Ok(SessionEnd::Exit);
                    }
                }
                Ok(_) if line.len() > MAX_LINE_BYTES => {
                    if !discarding {
                        warn!(limit = MAX_LINE_BYTES, "text message too long; discarding");
                    }
                    line.clear();
                    discarding = true;
                }
                // EOF mid-message; the next read returns 0.
                Ok(_) => {}
                // A quiet gap ends an unterminated message.
                Err(e) if is_timeout(&e) => {
                    if self.end_message(&mut line, &mut discarding) == Applied::Exit {
                        let _ = stream.shutdown(Shutdown::Both);
                        return Ok(SessionEnd::Exit);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Dispatch the buffered message unless it is the tail of a dropped one.
    fn end_message(&self, line: &mut Vec<u8>, discarding: &mut bool) -> Applied {
        let applied = if *discarding {
            Applied::Ignored
        } else {
            self.dispatch(line)
        };
        line.clear();
        *discarding = false;
        applied
    }

    fn dispatch(&self, raw: &[u8]) -> Applied {
        let message = String::from_utf8_lossy(raw);
        if message.trim().is_empty() {
            return Applied::Ignored;
        }
        self.demux.handle(WireFormat::Text, &message)
    }
}
