//! Application layer: pure use-case logic with the OS behind a trait seam.

pub mod dispatcher;
pub mod input_backend;

pub use dispatcher::CommandDispatcher;
pub use input_backend::{BackendError, InputBackend};
