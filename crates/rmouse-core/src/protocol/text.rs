//! Stream decoder for the newline-delimited JSON discipline.
//!
//! TCP delivers a byte stream with no message boundaries: one `read` may
//! contain half a command, or three commands and the start of a fourth.  The
//! [`StreamDecoder`] owns the receive buffer that papers over this: each read
//! chunk is appended, every complete newline-terminated line is decoded, and
//! the trailing fragment is retained for the next read.
//!
//! Commands are JSON objects tagged by a `type` field:
//! ```text
//! {"type":"move","dx":5,"dy":-3}
//! {"type":"click","button":"right","modifiers":3}
//! {"type":"scroll","amount":-2}
//! {"type":"drag_start"}  {"type":"drag_end"}
//! {"type":"text","text":"héllo"}
//! {"type":"key","key":"enter","modifiers":1}
//! {"type":"keyDown","key":"shift"}  {"type":"keyUp","key":"shift"}
//! ```
//!
//! A malformed line is reported as a per-line [`DecodeError`] and never
//! terminates decoding.  The buffer is capped: a client that streams bytes
//! with no delimiter past the cap gets a session-fatal
//! [`DecodeError::BufferOverflow`].

use serde::Deserialize;

use crate::command::{Command, ModifierSet, MouseButton};
use crate::protocol::DecodeError;

/// Default receive-buffer cap in bytes.
pub const DEFAULT_BUFFER_CAP: usize = 64 * 1024;

/// Raw shape of one JSON line before mapping onto [`Command`].
#[derive(Debug, Deserialize)]
struct WireCommand {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    dx: Option<i32>,
    #[serde(default)]
    dy: Option<i32>,
    #[serde(default)]
    button: Option<String>,
    #[serde(default)]
    amount: Option<i32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    modifiers: Option<u8>,
}

/// Accumulating decoder for one connection's byte stream.
pub struct StreamDecoder {
    buffer: Vec<u8>,
    cap: usize,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    /// Creates a decoder with the default buffer cap.
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_BUFFER_CAP)
    }

    /// Creates a decoder with an explicit buffer cap.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            buffer: Vec::new(),
            cap,
        }
    }

    /// Appends one read chunk and decodes every complete line in the buffer.
    ///
    /// Returns one entry per complete line: `Ok(Command)` for well-formed
    /// lines, `Err(DecodeError)` for malformed ones (the caller logs and
    /// skips those).  The trailing fragment, if any, is retained for the
    /// next call.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::BufferOverflow`] when the retained fragment
    /// exceeds the cap.  That error is session-fatal: the connection should
    /// be torn down.
    pub fn feed(
        &mut self,
        chunk: &[u8],
    ) -> Result<Vec<Result<Command, DecodeError>>, DecodeError> {
        self.buffer.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = trim_line(&line[..line.len() - 1]);
            if line.is_empty() {
                continue;
            }
            out.push(decode_line(line));
        }

        if self.buffer.len() > self.cap {
            return Err(DecodeError::BufferOverflow { cap: self.cap });
        }
        Ok(out)
    }

    /// The undecoded trailing fragment held for the next read.
    pub fn remainder(&self) -> &[u8] {
        &self.buffer
    }
}

/// Strips a trailing `\r` so CRLF clients work too.
fn trim_line(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((b'\r', rest)) => rest,
        _ => line,
    }
}

/// Decodes one complete JSON line into a [`Command`].
fn decode_line(line: &[u8]) -> Result<Command, DecodeError> {
    let wire: WireCommand = serde_json::from_slice(line)
        .map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
    map_wire_command(wire)
}

fn map_wire_command(wire: WireCommand) -> Result<Command, DecodeError> {
    let modifiers = ModifierSet(wire.modifiers.unwrap_or(0));
    match wire.kind.as_str() {
        "move" => Ok(Command::Move {
            dx: clamp_delta(wire.dx.unwrap_or(0)),
            dy: clamp_delta(wire.dy.unwrap_or(0)),
        }),
        "click" => {
            let button = match wire.button.as_deref() {
                Some("right") => MouseButton::Right,
                // The phone client defaults to left and only ever names
                // "left" or "right".
                _ => MouseButton::Left,
            };
            Ok(Command::Click { button, modifiers })
        }
        "scroll" => {
            // Older clients send a single vertical `amount`; newer ones send
            // independent dx/dy.
            let dy = wire.amount.or(wire.dy).unwrap_or(0);
            Ok(Command::Scroll {
                dx: clamp_delta(wire.dx.unwrap_or(0)),
                dy: clamp_delta(dy),
            })
        }
        "drag_start" => Ok(Command::Drag { pressed: true }),
        "drag_end" => Ok(Command::Drag { pressed: false }),
        "text" => Ok(Command::Text(wire.text.unwrap_or_default())),
        "key" => Ok(Command::KeyAction {
            modifiers,
            key: require_key(wire.key)?,
        }),
        "keyDown" => Ok(Command::KeyDown {
            key: require_key(wire.key)?,
        }),
        "keyUp" => Ok(Command::KeyUp {
            key: require_key(wire.key)?,
        }),
        other => Err(DecodeError::MalformedJson(format!(
            "unknown command type: {other:?}"
        ))),
    }
}

fn require_key(key: Option<String>) -> Result<String, DecodeError> {
    match key {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(DecodeError::MalformedJson(
            "key command with missing or empty key name".to_string(),
        )),
    }
}

/// Saturates a JSON integer delta into the wire's i16 range.
fn clamp_delta(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

// ── Tests ─────────────────────────────────────────────────────────────────────
