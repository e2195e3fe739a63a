//! WebSocket JSON transport.
//!
//! On connect the server sends `hello` with the current flags. Every
//! accepted message is acked with `state`; anything else gets an
//! `error` reply and the connection stays open. Binary frames are read
//! as UTF-8 text. Pings are answered by tungstenite on the next read.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tungstenite::{HandshakeError, Message, WebSocket};

use super::{SessionEnd, accept_next, bind_listener, configure_stream, is_disconnect, is_timeout};
use crate::error::ControlError;
use crate::protocol::json::ServerMessage;
use crate::protocol::{Demultiplexer, WireFormat};
use crate::state::{Applied, ControlState};

/// Single-client WebSocket server for the JSON protocol.
#[derive(Debug)]
pub struct WsServer {
    listener: TcpListener,
    demux: Demultiplexer,
    poll: Duration,
    release_on_disconnect: bool,
}

impl WsServer {
    pub fn bind(addr: &str, state: Arc<ControlState>, poll: Duration) -> Result<Self, ControlError> {
        Ok(Self {
            listener: bind_listener(addr)?,
            demux: Demultiplexer::new(state),
            poll,
            release_on_disconnect: false,
        })
    }

    /// Clear every flag when a client goes away.
    pub fn release_on_disconnect(mut self, enabled: bool) -> Self {
        self.release_on_disconnect = enabled;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ControlError> {
        self.listener
            .local_addr()
            .map_err(|e| ControlError::io("ws listener address", e))
    }

    /// Accept and serve clients until shutdown.
    pub fn serve(self) -> Result<(), ControlError> {
        info!(addr = %self.local_addr()?, "ws transport listening");
        let state = Arc::clone(self.demux.state());

        while let Some((stream, peer)) = accept_next(&self.listener, &state, self.poll)? {
            info!(%peer, "ws client connected");
            match self.session(stream) {
                Ok(SessionEnd::Shutdown) => {
                    info!(%peer, "closing ws client for shutdown");
                    continue;
                }
                Ok(_) => info!(%peer, "ws client disconnected"),
                Err(tungstenite::Error::Io(e)) if is_disconnect(&e) => {
                    info!(%peer, error = %e, "ws client dropped")
                }
                Err(e) => warn!(%peer, error = %e, "ws session failed; accepting next client"),
            }
            if self.release_on_disconnect {
                state.clear_flags();
                info!(%peer, "released all keys on disconnect");
            }
        }

        info!("ws transport stopped");
        Ok(())
    }

    fn session(&self, stream: TcpStream) -> Result<SessionEnd, tungstenite::Error> {
        configure_stream(&stream, self.poll)?;
        let state = self.demux.state();

        // A client that stalls mid-handshake must not block shutdown.
        let mut handshake = tungstenite::accept(stream);
        let mut ws = loop {
            match handshake {
                Ok(ws) => break ws,
                Err(HandshakeError::Interrupted(mid)) => {
                    if state.is_shutdown() {
                        return Ok(SessionEnd::Shutdown);
                    }
                    handshake = mid.handshake();
                }
                Err(HandshakeError::Failure(e)) => return Err(e),
            }
        };
        send(&mut ws, &ServerMessage::hello(state.snapshot()))?;

        loop {
            if state.is_shutdown() {
                let _ = ws.close(None);
                let _ = ws.flush();
                return Ok(SessionEnd::Shutdown);
            }
            match ws.read() {
                Ok(Message::Text(text)) => self.reply(&mut ws, &text)?,
                Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                    Ok(text) => self.reply(&mut ws, text)?,
                    Err(_) => send(&mut ws, &ServerMessage::unknown())?,
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "close frame received");
                    let _ = ws.flush();
                    return Ok(SessionEnd::PeerClosed);
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(e)) if is_timeout(&e) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(SessionEnd::PeerClosed);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn reply(&self, ws: &mut WebSocket<TcpStream>, text: &str) -> Result<(), tungstenite::Error> {
        let reply = match self.demux.handle(WireFormat::Json, text) {
            Applied::Updated(flags) => ServerMessage::state(flags),
            Applied::Exit => ServerMessage::state(self.demux.state().snapshot()),
            Applied::Ignored => ServerMessage::unknown(),
        };
        send(ws, &reply)
    }
}

fn send(ws: &mut WebSocket<TcpStream>, msg: &ServerMessage) -> Result<(), tungstenite::Error> {
    let text = msg
        .to_json()
        .map_err(|e| tungstenite::Error::Io(e.into()))?;
    ws.send(Message::Text(text))
}
