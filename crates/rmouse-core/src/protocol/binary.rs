//! Binary codec for opcode-prefixed command frames.
//!
//! Wire format, one discrete message per command:
//! ```text
//! [opcode:1][payload...]
//! ```
//! The opcode determines the payload layout.  Deltas are signed 16-bit
//! big-endian, which bounds single-message motion to `[-32768, 32767]` per
//! axis; clients chunk larger motions across multiple Move frames.
//!
//! | Opcode | Layout                        | Command            |
//! |--------|-------------------------------|--------------------|
//! | `0x01` | `dx:i16be, dy:i16be`          | relative move      |
//! | `0x02` | `button:u8 [, modmask:u8]`    | click              |
//! | `0x03` | `dx:i16be, dy:i16be`          | scroll             |
//! | `0x04` | `state:u8`                    | drag down(1)/up    |
//! | `0x05` | UTF-8 bytes (rest of message) | text paste         |
//! | `0x06` | `modmask:u8`, UTF-8 key name  | key with modifiers |
//!
//! Text payloads have no length field: they consume the remaining bytes of
//! the message, which is why this discipline only works on message-oriented
//! transports and cannot be framed onto a raw byte stream.

use crate::command::{Command, ModifierSet, MouseButton};
use crate::protocol::DecodeError;

/// Opcode for relative pointer motion.
pub const OP_MOVE: u8 = 0x01;
/// Opcode for a click with optional modifier mask.
pub const OP_CLICK: u8 = 0x02;
/// Opcode for scroll.
pub const OP_SCROLL: u8 = 0x03;
/// Opcode for the left-button drag latch.
pub const OP_DRAG: u8 = 0x04;
/// Opcode for Unicode text paste.
pub const OP_TEXT: u8 = 0x05;
/// Opcode for a named key press with modifiers.
pub const OP_KEY_ACTION: u8 = 0x06;

/// Decodes one discrete binary frame into a [`Command`].
///
/// # Errors
///
/// Returns [`DecodeError`] for empty frames, unknown opcodes, payloads
/// shorter than the opcode's minimum layout, or invalid UTF-8 tails.  All of
/// these are transient: callers drop the frame and continue with the next.
///
/// # Examples
///
/// ```rust
/// use rmouse_core::{decode_frame, Command};
///
/// let frame = [0x01, 0x00, 0x03, 0xFF, 0xFC]; // move dx=3, dy=-4
/// assert_eq!(decode_frame(&frame).unwrap(), Command::Move { dx: 3, dy: -4 });
/// ```
pub fn decode_frame(data: &[u8]) -> Result<Command, DecodeError> {
    let (&opcode, payload) = data.split_first().ok_or(DecodeError::EmptyFrame)?;

    match opcode {
        OP_MOVE => {
            let (dx, dy) = read_delta_pair(opcode, payload)?;
            Ok(Command::Move { dx, dy })
        }
        OP_CLICK => {
            require_len(opcode, payload, 1)?;
            let button = MouseButton::from_wire(payload[0]);
            // The modifier mask byte is optional; older clients omit it.
            let modifiers = ModifierSet(payload.get(1).copied().unwrap_or(0));
            Ok(Command::Click { button, modifiers })
        }
        OP_SCROLL => {
            let (dx, dy) = read_delta_pair(opcode, payload)?;
            Ok(Command::Scroll { dx, dy })
        }
        OP_DRAG => {
            require_len(opcode, payload, 1)?;
            Ok(Command::Drag {
                pressed: payload[0] == 0x01,
            })
        }
        OP_TEXT => {
            let text = read_utf8_tail(payload)?;
            Ok(Command::Text(text))
        }
        OP_KEY_ACTION => {
            require_len(opcode, payload, 1)?;
            let modifiers = ModifierSet(payload[0]);
            let key = read_utf8_tail(&payload[1..])?;
            Ok(Command::KeyAction { modifiers, key })
        }
        other => Err(DecodeError::UnknownOpcode(other)),
    }
}

fn require_len(opcode: u8, payload: &[u8], needed: usize) -> Result<(), DecodeError> {
    if payload.len() < needed {
        Err(DecodeError::TruncatedPayload {
            opcode,
            needed,
            available: payload.len(),
        })
    } else {
        Ok(())
    }
}

/// Reads two signed 16-bit big-endian deltas from the payload.
fn read_delta_pair(opcode: u8, payload: &[u8]) -> Result<(i16, i16), DecodeError> {
    require_len(opcode, payload, 4)?;
    let dx = i16::from_be_bytes([payload[0], payload[1]]);
    let dy = i16::from_be_bytes([payload[2], payload[3]]);
    Ok((dx, dy))
}

/// Consumes the remaining bytes of the message as UTF-8 text.
fn read_utf8_tail(payload: &[u8]) -> Result<String, DecodeError> {
    std::str::from_utf8(payload)
        .map(str::to_string)
        .map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn move_frame(dx: i16, dy: i16) -> Vec<u8> {
        let mut f = vec![OP_MOVE];
        f.extend_from_slice(&dx.to_be_bytes());
        f.extend_from_slice(&dy.to_be_bytes());
        f
    }

    #[test]
    fn test_decode_move_positive_deltas() {
        let cmd = decode_frame(&move_frame(5, 12)).unwrap();
        assert_eq!(cmd, Command::Move { dx: 5, dy: 12 });
    }

    #[test]
    fn test_decode_move_negative_deltas() {
        let cmd = decode_frame(&move_frame(-300, -1)).unwrap();
        assert_eq!(cmd, Command::Move { dx: -300, dy: -1 });
    }

    #[test]
    fn test_decode_move_extreme_deltas() {
        let cmd = decode_frame(&move_frame(i16::MIN, i16::MAX)).unwrap();
        assert_eq!(
            cmd,
            Command::Move {
                dx: i16::MIN,
                dy: i16::MAX
            }
        );
    }

    #[test]
    fn test_decode_move_truncated_payload_is_error() {
        // 0x01 with only 3 payload bytes: must be dropped, not panic.
        let result = decode_frame(&[OP_MOVE, 0x00, 0x01, 0x00]);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedPayload {
                opcode: OP_MOVE,
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_click_left_without_mask() {
        let cmd = decode_frame(&[OP_CLICK, 0x01]).unwrap();
        assert_eq!(
            cmd,
            Command::Click {
                button: MouseButton::Left,
                modifiers: ModifierSet(0)
            }
        );
    }

    #[test]
    fn test_decode_click_right_with_mask() {
        let cmd = decode_frame(&[OP_CLICK, 0x02, 0b1011]).unwrap();
        assert_eq!(
            cmd,
            Command::Click {
                button: MouseButton::Right,
                modifiers: ModifierSet(0b1011)
            }
        );
    }

    #[test]
    fn test_decode_click_empty_payload_is_error() {
        assert!(matches!(
            decode_frame(&[OP_CLICK]),
            Err(DecodeError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_decode_scroll_both_axes() {
        let mut f = vec![OP_SCROLL];
        f.extend_from_slice(&(-2i16).to_be_bytes());
        f.extend_from_slice(&7i16.to_be_bytes());
        assert_eq!(
            decode_frame(&f).unwrap(),
            Command::Scroll { dx: -2, dy: 7 }
        );
    }

    #[test]
    fn test_decode_drag_down_and_up() {
        assert_eq!(
            decode_frame(&[OP_DRAG, 0x01]).unwrap(),
            Command::Drag { pressed: true }
        );
        // Anything other than 0x01 releases.
        assert_eq!(
            decode_frame(&[OP_DRAG, 0x00]).unwrap(),
            Command::Drag { pressed: false }
        );
        assert_eq!(
            decode_frame(&[OP_DRAG, 0x7F]).unwrap(),
            Command::Drag { pressed: false }
        );
    }

    #[test]
    fn test_decode_text_consumes_rest_of_message() {
        let mut f = vec![OP_TEXT];
        f.extend_from_slice("héllo 世界".as_bytes());
        assert_eq!(
            decode_frame(&f).unwrap(),
            Command::Text("héllo 世界".to_string())
        );
    }

    #[test]
    fn test_decode_text_empty_payload_is_empty_string() {
        assert_eq!(decode_frame(&[OP_TEXT]).unwrap(), Command::Text(String::new()));
    }

    #[test]
    fn test_decode_text_invalid_utf8_is_error() {
        let result = decode_frame(&[OP_TEXT, 0xFF, 0xFE]);
        assert!(matches!(result, Err(DecodeError::InvalidUtf8(_))));
    }

    #[test]
    fn test_decode_key_action_with_modifiers() {
        let mut f = vec![OP_KEY_ACTION, ModifierSet::CTRL | ModifierSet::SHIFT];
        f.extend_from_slice(b"enter");
        assert_eq!(
            decode_frame(&f).unwrap(),
            Command::KeyAction {
                modifiers: ModifierSet(0b011),
                key: "enter".to_string()
            }
        );
    }

    #[test]
    fn test_decode_key_action_missing_mask_is_error() {
        assert!(matches!(
            decode_frame(&[OP_KEY_ACTION]),
            Err(DecodeError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_decode_unknown_opcode_is_error() {
        assert_eq!(decode_frame(&[0x7F, 0x00]), Err(DecodeError::UnknownOpcode(0x7F)));
    }

    #[test]
    fn test_decode_empty_frame_is_error() {
        assert_eq!(decode_frame(&[]), Err(DecodeError::EmptyFrame));
    }
}
