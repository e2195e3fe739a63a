//! Shared harness for the integration tests.

mod end_to_end;
mod reconnect;
mod ws;

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use robodrive_common::control::MotionCommand;
use robodrive_control::command::arbitration::ArbitrationPolicy;
use robodrive_control::cycle::ArbitrationEngine;
use robodrive_control::error::ControlError;
use robodrive_control::shutdown::ShutdownCoordinator;
use robodrive_control::state::ControlState;
use robodrive_control::transport::{TextServer, WsServer};
use robodrive_hal::{Journal, SimulationActuator};
use serde_json::Value;
use tungstenite::{Message, WebSocket};

const TICK: Duration = Duration::from_micros(200);
const POLL: Duration = Duration::from_millis(10);
const DEADLINE: Duration = Duration::from_secs(3);

/// A running controller bound to ephemeral loopback ports.
pub struct Harness {
    pub state: Arc<ControlState>,
    pub journal: Journal,
    pub text_addr: SocketAddr,
    pub ws_addr: SocketAddr,
    coordinator: Option<ShutdownCoordinator>,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with(ArbitrationPolicy::Table, false)
    }

    pub fn start_with(policy: ArbitrationPolicy, release_on_disconnect: bool) -> Self {
        let state = ControlState::shared();
        let sim = SimulationActuator::new();
        let journal = sim.journal();

        let text = TextServer::bind("127.0.0.1:0", Arc::clone(&state), POLL).unwrap();
        let ws = WsServer::bind("127.0.0.1:0", Arc::clone(&state), POLL)
            .unwrap()
            .release_on_disconnect(release_on_disconnect);
        let text_addr = text.local_addr().unwrap();
        let ws_addr = ws.local_addr().unwrap();

        let mut engine = ArbitrationEngine::new(Arc::clone(&state), Box::new(sim), policy);
        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&state));
        coordinator
            .spawn("arbitration", move || engine.run(TICK).map(|_| ()))
            .unwrap();
        coordinator.spawn("text-transport", move || text.serve()).unwrap();
        coordinator.spawn("ws-transport", move || ws.serve()).unwrap();

        Self {
            state,
            journal,
            text_addr,
            ws_addr,
            coordinator: Some(coordinator),
        }
    }

    /// Every actuator call so far, in order.
    pub fn calls(&self) -> Vec<MotionCommand> {
        self.journal.lock().clone()
    }

    /// Wait until the journal equals `expected`; panics on timeout.
    pub fn expect_calls(&self, expected: &[MotionCommand]) {
        assert!(
            wait_until(|| self.calls() == expected),
            "expected {expected:?}, journal is {:?}",
            self.calls()
        );
    }

    pub fn text_client(&self) -> TcpStream {
        TcpStream::connect(self.text_addr).unwrap()
    }

    /// Connect a WebSocket client and return it with the hello message.
    pub fn ws_client(&self) -> (WebSocket<TcpStream>, Value) {
        let stream = TcpStream::connect(self.ws_addr).unwrap();
        stream.set_read_timeout(Some(DEADLINE)).unwrap();
        let (mut ws, _) = tungstenite::client(format!("ws://{}/", self.ws_addr), stream).unwrap();
        let hello = ws_recv(&mut ws);
        (ws, hello)
    }

    /// Join every worker; returns once the controller has fully stopped.
    pub fn join(&mut self) -> Result<(), ControlError> {
        match self.coordinator.take() {
            Some(coordinator) => coordinator.wait(),
            None => Ok(()),
        }
    }

    pub fn shutdown(mut self) -> Result<(), ControlError> {
        self.state.request_shutdown();
        self.join()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.state.request_shutdown();
        if let Some(coordinator) = self.coordinator.take() {
            let _ = coordinator.wait();
        }
    }
}

/// Poll `cond` until it holds or the deadline passes.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + DEADLINE;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Let the engine run a good number of ticks.
pub fn settle() {
    std::thread::sleep(Duration::from_millis(40));
}

pub fn send_line(stream: &mut TcpStream, message: &str) {
    stream.write_all(format!("{message}\n").as_bytes()).unwrap();
    stream.flush().unwrap();
}

/// Write one message with no trailing newline.
pub fn send_bare(stream: &mut TcpStream, message: &str) {
    stream.write_all(message.as_bytes()).unwrap();
    stream.flush().unwrap();
}

pub fn ws_send(ws: &mut WebSocket<TcpStream>, text: &str) {
    ws.send(Message::Text(text.to_string())).unwrap();
}

/// Next text frame as JSON.
pub fn ws_recv(ws: &mut WebSocket<TcpStream>) -> Value {
    loop {
        match ws.read().unwrap() {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            _ => continue,
        }
    }
}
