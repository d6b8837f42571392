//! Wire codecs: the binary opcode discipline and the newline-JSON discipline.

pub mod binary;
pub mod text;

use thiserror::Error;

/// Errors produced while decoding either wire discipline.
///
/// All variants except [`DecodeError::BufferOverflow`] are transient: the
/// offending frame or line is dropped and the session continues.
/// `BufferOverflow` means a client streamed data with no delimiter past the
/// receive-buffer cap and is session-fatal.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The frame was empty (zero bytes).
    #[error("empty frame")]
    EmptyFrame,

    /// The opcode byte is not a recognized value.
    #[error("unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    /// The payload is shorter than the opcode's minimum layout.
    #[error("truncated payload for opcode 0x{opcode:02X}: need {needed} bytes, got {available}")]
    TruncatedPayload {
        opcode: u8,
        needed: usize,
        available: usize,
    },

    /// A variable-length text tail was not valid UTF-8.
    #[error("invalid UTF-8 in payload: {0}")]
    InvalidUtf8(String),

    /// A JSON line could not be parsed or had an unknown `type`.
    #[error("malformed JSON command: {0}")]
    MalformedJson(String),

    /// The receive buffer grew past its cap with no delimiter in sight.
    /// Session-fatal.
    #[error("receive buffer exceeded cap of {cap} bytes without a delimiter")]
    BufferOverflow { cap: usize },
}

pub use binary::decode_frame;
pub use text::StreamDecoder;
