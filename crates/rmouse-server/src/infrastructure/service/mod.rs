//! Service lifecycle: the discovery responder and the command transport
//! supervised as one start/stop/restart-able unit.

pub mod manager;
pub mod shutdown;

pub use manager::{ServiceError, ServiceManager, ServiceSettings, ServiceState};
pub use shutdown::ShutdownToken;
