//! Integration test: WebSocket JSON transport.
//!
//! Validates: hello carries current flags, commands override rather than
//! merge, malformed messages get an error reply without closing the
//! connection, and the structured protocol has no exit.

use robodrive_common::control::{DirectionFlags, MotionCommand};
use robodrive_control::command::arbitration::ArbitrationPolicy;

use super::{Harness, send_line, wait_until, ws_recv, ws_send};

#[test]
fn hello_reflects_current_flags() {
    let h = Harness::start();
    let mut text = h.text_client();
    send_line(&mut text, "'a' press");
    assert!(wait_until(|| h.state.snapshot() == DirectionFlags::LEFT));

    let (_ws, hello) = h.ws_client();
    assert_eq!(hello["type"], "hello");
    assert_eq!(hello["state"]["left"], true);
    assert_eq!(hello["state"]["forward"], false);
}

#[test]
fn command_forward_round_trip() {
    let h = Harness::start();
    let (mut ws, _) = h.ws_client();

    ws_send(&mut ws, r#"{"type":"command","cmd":"forward"}"#);
    let ack = ws_recv(&mut ws);
    assert_eq!(ack["type"], "state");
    assert_eq!(
        ack["state"],
        serde_json::json!({"forward": true, "backward": false, "left": false, "right": false})
    );
    h.expect_calls(&[MotionCommand::Forward]);

    ws_send(&mut ws, r#"{"type":"command","cmd":"stop"}"#);
    assert_eq!(ws_recv(&mut ws)["state"]["forward"], false);
    h.expect_calls(&[MotionCommand::Forward, MotionCommand::None]);
}

#[test]
fn command_overrides_held_keys() {
    let h = Harness::start();
    let (mut ws, _) = h.ws_client();

    ws_send(&mut ws, r#"{"type":"key","key":"s","action":"down"}"#);
    ws_recv(&mut ws);
    ws_send(&mut ws, r#"{"type":"key","key":"d","action":"down"}"#);
    ws_recv(&mut ws);
    ws_send(&mut ws, "left");
    let ack = ws_recv(&mut ws);
    assert_eq!(ack["state"]["left"], true);
    assert_eq!(ack["state"]["backward"], false);
    assert_eq!(h.state.snapshot(), DirectionFlags::LEFT);
}

#[test]
fn malformed_message_keeps_connection_open() {
    let h = Harness::start();
    let (mut ws, _) = h.ws_client();

    ws_send(&mut ws, r#"{"type":"key","key":"w","action":"down"}"#);
    ws_recv(&mut ws);

    for bad in ["not json", r#"{"type":"key","key":"w"}"#, r#"{"cmd":"forward"}"#] {
        ws_send(&mut ws, bad);
        let reply = ws_recv(&mut ws);
        assert_eq!(reply["type"], "error", "message {bad:?}");
        assert_eq!(reply["message"], "unknown message");
    }
    assert_eq!(h.state.snapshot(), DirectionFlags::FORWARD);

    // Same connection still accepted.
    ws_send(&mut ws, r#"{"type":"key","key":"w","action":"up"}"#);
    assert_eq!(ws_recv(&mut ws)["type"], "state");
    assert_eq!(h.state.snapshot(), DirectionFlags::empty());
}

#[test]
fn exit_is_not_part_of_the_structured_protocol() {
    let h = Harness::start();
    let (mut ws, _) = h.ws_client();

    ws_send(&mut ws, "exit");
    assert_eq!(ws_recv(&mut ws)["type"], "error");
    ws_send(&mut ws, r#"{"type":"exit"}"#);
    assert_eq!(ws_recv(&mut ws)["type"], "error");
    assert!(!h.state.is_shutdown());
}

#[test]
fn disconnect_keeps_flags_unless_configured() {
    let h = Harness::start();
    let (mut ws, _) = h.ws_client();
    ws_send(&mut ws, r#"{"type":"command","cmd":"right"}"#);
    ws_recv(&mut ws);
    ws.close(None).unwrap();
    drop(ws);
    let (_again, hello) = h.ws_client();
    assert_eq!(hello["state"]["right"], true);

    let released = Harness::start_with(ArbitrationPolicy::Table, true);
    let (mut ws, _) = released.ws_client();
    ws_send(&mut ws, r#"{"type":"command","cmd":"right"}"#);
    ws_recv(&mut ws);
    released.expect_calls(&[MotionCommand::Right]);
    ws.close(None).unwrap();
    drop(ws);
    assert!(wait_until(|| released.state.snapshot() == DirectionFlags::empty()));
    released.expect_calls(&[MotionCommand::Right, MotionCommand::None]);
}
