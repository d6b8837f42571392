//! Remote Mouse host-side relay library.
//!
//! Exposes the application layer (command dispatch, the `InputBackend`
//! seam) and infrastructure (discovery responder, TCP command server,
//! service lifecycle, configuration) for use by the binary and by
//! integration tests.

pub mod application;
pub mod infrastructure;
