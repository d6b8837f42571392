//! Infrastructure layer: sockets, threads, configuration, and the mock
//! input backend.

pub mod backend;
pub mod network;
pub mod service;
pub mod storage;
