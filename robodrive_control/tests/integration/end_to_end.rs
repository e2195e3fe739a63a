//! Integration test: key sessions over the text transport.
//!
//! Validates: press → exactly one actuator call, turn while driving
//! forward keeps forward, cancel-all stops once, `exit` stops once and
//! nothing reaches the actuator afterwards.

use std::net::TcpStream;

use robodrive_common::control::{DirectionFlags, MotionCommand};
use robodrive_control::command::arbitration::ArbitrationPolicy;

use super::{Harness, send_bare, send_line, settle, wait_until};

#[test]
fn press_forward_issues_exactly_one_call() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Forward]);
    assert_eq!(h.state.previous(), MotionCommand::Forward);
}

#[test]
fn unterminated_messages_are_served_one_per_write() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_bare(&mut client, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    settle();
    send_bare(&mut client, "'w' release");
    h.expect_calls(&[MotionCommand::Forward, MotionCommand::None]);
}

#[test]
fn turn_while_forward_adds_no_call() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    send_line(&mut client, "'a' press");
    assert!(wait_until(|| h.state.snapshot()
        == DirectionFlags::FORWARD | DirectionFlags::LEFT));
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Forward]);

    // Releasing forward leaves the turn.
    send_line(&mut client, "'w' release");
    h.expect_calls(&[MotionCommand::Forward, MotionCommand::Left]);
    send_line(&mut client, "'a' release");
    h.expect_calls(&[MotionCommand::Forward, MotionCommand::Left, MotionCommand::None]);
}

#[test]
fn holding_all_keys_stops_once() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "'s' press");
    h.expect_calls(&[MotionCommand::Backward]);
    // a and d hold Backward; w completes the all-cancel pattern
    for key in ["a", "d", "w"] {
        send_line(&mut client, &format!("'{key}' press"));
    }
    h.expect_calls(&[MotionCommand::Backward, MotionCommand::None]);
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Backward, MotionCommand::None]);
    assert_eq!(h.state.previous(), MotionCommand::None);
}

#[test]
fn repeated_presses_are_idempotent() {
    let h = Harness::start();
    let mut client = h.text_client();

    for _ in 0..5 {
        send_line(&mut client, "'d' press");
    }
    h.expect_calls(&[MotionCommand::Right]);
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Right]);
}

#[test]
fn malformed_lines_are_ignored() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "Key.space press");
    send_line(&mut client, "'q' press");
    send_line(&mut client, "EXIT");
    send_line(&mut client, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    assert!(!h.state.is_shutdown());
}

#[test]
fn exit_stops_once_and_is_terminal() {
    let mut h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "'w' press");
    h.expect_calls(&[MotionCommand::Forward]);
    send_line(&mut client, "exit");
    h.join().unwrap();

    assert!(h.state.is_shutdown());
    assert_eq!(h.calls(), vec![MotionCommand::Forward, MotionCommand::None]);
    assert_eq!(h.state.previous(), MotionCommand::None);

    // Listener is gone; even if a connect slips through nothing is served.
    if let Ok(mut late) = TcpStream::connect(h.text_addr) {
        let _ = std::io::Write::write_all(&mut late, b"'s' press\n");
    }
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Forward, MotionCommand::None]);
}

#[test]
fn table_gap_holds_previous_command() {
    let h = Harness::start();
    let mut client = h.text_client();

    send_line(&mut client, "'s' press");
    h.expect_calls(&[MotionCommand::Backward]);
    // forward+left arriving from Backward matches no rule
    h.state.override_flags(DirectionFlags::FORWARD | DirectionFlags::LEFT);
    settle();
    assert_eq!(h.calls(), vec![MotionCommand::Backward]);
}

#[test]
fn fallback_policy_resolves_gap() {
    let h = Harness::start_with(ArbitrationPolicy::PriorityFallback, false);
    let mut client = h.text_client();

    send_line(&mut client, "'s' press");
    h.expect_calls(&[MotionCommand::Backward]);
    h.state.override_flags(DirectionFlags::FORWARD | DirectionFlags::LEFT);
    h.expect_calls(&[MotionCommand::Backward, MotionCommand::Forward]);
    h.shutdown().unwrap();
}
