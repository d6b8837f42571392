//! Integration tests proving the two wire disciplines are equivalent.
//!
//! # Purpose
//!
//! The relay accepts commands over two framings:
//!
//! - **Binary**: `[opcode][payload]`, one discrete message per command, used
//!   by message-oriented transports.
//! - **Text**: newline-delimited JSON objects, used on the raw TCP stream.
//!
//! The dispatcher must not care which framing a command arrived over, so for
//! every command shape both transports can express, the decoded [`Command`]
//! values must be identical.  These tests build the same logical command in
//! both framings and assert the decoders agree.

use rmouse_core::{decode_frame, Command, ModifierSet, MouseButton, StreamDecoder};

fn decode_text_line(line: &str) -> Command {
    let mut decoder = StreamDecoder::new();
    let mut out = decoder
        .feed(format!("{line}\n").as_bytes())
        .expect("no overflow");
    assert_eq!(out.len(), 1, "exactly one command per line");
    out.remove(0).expect("line must decode")
}

#[test]
fn test_move_decodes_identically_in_both_disciplines() {
    let mut frame = vec![0x01];
    frame.extend_from_slice(&3i16.to_be_bytes());
    frame.extend_from_slice(&(-4i16).to_be_bytes());

    let from_binary = decode_frame(&frame).unwrap();
    let from_text = decode_text_line("{\"type\":\"move\",\"dx\":3,\"dy\":-4}");

    assert_eq!(from_binary, from_text);
    assert_eq!(from_binary, Command::Move { dx: 3, dy: -4 });
}

#[test]
fn test_click_with_modifiers_decodes_identically() {
    let from_binary = decode_frame(&[0x02, 0x01, 0b0101]).unwrap();
    let from_text =
        decode_text_line("{\"type\":\"click\",\"button\":\"left\",\"modifiers\":5}");

    assert_eq!(from_binary, from_text);
    assert_eq!(
        from_binary,
        Command::Click {
            button: MouseButton::Left,
            modifiers: ModifierSet(0b0101)
        }
    );
}

#[test]
fn test_right_click_decodes_identically() {
    let from_binary = decode_frame(&[0x02, 0x02]).unwrap();
    let from_text = decode_text_line("{\"type\":\"click\",\"button\":\"right\"}");
    assert_eq!(from_binary, from_text);
}

#[test]
fn test_scroll_decodes_identically() {
    let mut frame = vec![0x03];
    frame.extend_from_slice(&0i16.to_be_bytes());
    frame.extend_from_slice(&(-2i16).to_be_bytes());

    let from_binary = decode_frame(&frame).unwrap();
    let from_text = decode_text_line("{\"type\":\"scroll\",\"amount\":-2}");
    assert_eq!(from_binary, from_text);
}

#[test]
fn test_drag_latch_decodes_identically() {
    assert_eq!(
        decode_frame(&[0x04, 0x01]).unwrap(),
        decode_text_line("{\"type\":\"drag_start\"}")
    );
    assert_eq!(
        decode_frame(&[0x04, 0x00]).unwrap(),
        decode_text_line("{\"type\":\"drag_end\"}")
    );
}

#[test]
fn test_unicode_text_decodes_identically() {
    let text = "你好, мир! 🖱";
    let mut frame = vec![0x05];
    frame.extend_from_slice(text.as_bytes());

    let from_binary = decode_frame(&frame).unwrap();
    let from_text = decode_text_line(&format!(
        "{{\"type\":\"text\",\"text\":{}}}",
        serde_json::to_string(text).unwrap()
    ));
    assert_eq!(from_binary, from_text);
    assert_eq!(from_binary, Command::Text(text.to_string()));
}

#[test]
fn test_key_action_decodes_identically() {
    let mut frame = vec![0x06, 0b1000];
    frame.extend_from_slice(b"tab");

    let from_binary = decode_frame(&frame).unwrap();
    let from_text = decode_text_line("{\"type\":\"key\",\"key\":\"tab\",\"modifiers\":8}");
    assert_eq!(from_binary, from_text);
}

#[test]
fn test_bad_frames_fail_without_affecting_subsequent_decodes() {
    // Binary: a truncated move frame errors, the next frame decodes fine.
    assert!(decode_frame(&[0x01, 0x00]).is_err());
    assert!(decode_frame(&[0x04, 0x01]).is_ok());

    // Text: a malformed line errors, the following line on the same stream
    // decodes fine.
    let mut decoder = StreamDecoder::new();
    let out = decoder
        .feed(b"{broken\n{\"type\":\"drag_end\"}\n")
        .unwrap();
    assert!(out[0].is_err());
    assert_eq!(out[1].as_ref().unwrap(), &Command::Drag { pressed: false });
}
