//! Input backend implementations.
//!
//! The tracing backend is what the headless binary runs with; real OS
//! adapters (XTest, SendInput, CGEvent) are supplied by downstream packaging
//! and implement the same [`crate::application::InputBackend`] trait.  The
//! recording mock backs the test suites.

pub mod logging;
pub mod mock;

pub use logging::TracingInputBackend;
pub use mock::MockInputBackend;
