//! Integration test: connection drops and reconnects.
//!
//! Validates: flags survive a disconnect, the text transport serves the
//! next client after EOF or reset, and a stale session cannot block
//! shutdown.

use std::io::Write;
use std::net::Shutdown;

use robodrive_common::control::{DirectionFlags, MotionCommand};

use super::{Harness, send_line, settle, wait_until};

#[test]
fn flags_survive_reconnect() {
    let h = Harness::start();

    let mut first = h.text_client();
    send_line(&mut first, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    drop(first);

    let mut second = h.text_client();
    send_line(&mut second, "'a' press");
    assert!(wait_until(|| h.state.snapshot()
        == DirectionFlags::FORWARD | DirectionFlags::LEFT));
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Forward]);

    send_line(&mut second, "'w' release");
    h.expect_calls(&[MotionCommand::Forward, MotionCommand::Left]);
}

#[test]
fn half_written_line_then_drop_serves_next_client() {
    let h = Harness::start();

    let mut first = h.text_client();
    first.write_all(b"'d' pre").unwrap();
    first.shutdown(Shutdown::Both).unwrap();
    drop(first);

    let mut second = h.text_client();
    send_line(&mut second, "'s' press");
    h.expect_calls(&[MotionCommand::Backward]);
    assert_eq!(h.state.snapshot(), DirectionFlags::BACKWARD);
}

#[test]
fn exit_from_reconnected_client_stops_once() {
    let mut h = Harness::start();

    let mut first = h.text_client();
    send_line(&mut first, "'s' press");
    h.expect_calls(&[MotionCommand::Backward]);
    drop(first);

    let mut second = h.text_client();
    send_line(&mut second, "exit");
    h.join().unwrap();
    assert_eq!(h.calls(), vec![MotionCommand::Backward, MotionCommand::None]);
}

#[test]
fn shutdown_interrupts_idle_session() {
    let h = Harness::start();
    let _idle = h.text_client();
    let (_ws, _) = h.ws_client();
    settle();
    h.shutdown().unwrap();
}
