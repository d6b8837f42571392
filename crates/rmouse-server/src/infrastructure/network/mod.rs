//! Network listeners: UDP discovery and the TCP command transport.

pub mod discovery;
pub mod server;
