//! # rmouse-core
//!
//! Shared library for the Remote Mouse relay containing the command data
//! model, modifier handling, and the two wire codecs (binary opcode frames
//! and newline-delimited JSON).
//!
//! This crate is used by the server and by any future native client.  It has
//! zero dependencies on OS APIs or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! Remote Mouse turns a phone into a wireless touchpad and keyboard for a
//! desktop machine.  The phone discovers the host on the LAN, opens a
//! persistent connection, and streams small input commands: "move the cursor
//! 3 px right", "click", "type this text".
//!
//! This crate (`rmouse-core`) is the shared foundation.  It defines:
//!
//! - **`command`** – The typed [`Command`] enum that all transports decode
//!   into, plus modifier bitmask expansion and platform key-name
//!   normalization.
//!
//! - **`protocol`** – How bytes become commands.  Two disciplines exist side
//!   by side: a compact binary format (`[opcode][payload]`, one message per
//!   command) used by message-oriented transports, and newline-delimited
//!   JSON objects used on the raw TCP stream.  Both decode into the same
//!   [`Command`] values.

pub mod command;
pub mod protocol;

pub use command::{Command, Modifier, ModifierSet, MouseButton, Platform};
pub use protocol::binary::decode_frame;
pub use protocol::text::StreamDecoder;
pub use protocol::DecodeError;
