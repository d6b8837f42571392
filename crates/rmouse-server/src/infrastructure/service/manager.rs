//! ServiceManager: supervises the discovery responder and the command
//! transport as a single start/stop/restart-able unit.
//!
//! # Lifecycle
//!
//! ```text
//! Stopped ── start() ──▶ Starting ──▶ Running
//!    ▲                      │            │
//!    │   (start failure:    │            │ stop()
//!    │    automatic stop)   │            ▼
//!    └──────────────────────┴──────── Stopping
//! ```
//!
//! `start()` binds the transport first (so discovery can advertise the
//! actual bound port, which matters when the configured port is 0), then
//! the discovery responder.  Any failure mid-start triggers an automatic
//! teardown of whatever did come up; a half-started state, with discovery
//! answering probes for a transport that never bound, is never observable.
//!
//! `stop()` reverses the order: discovery goes first, so no new client is
//! pointed at a transport that is about to close.  Both listener threads
//! observe their shutdown token within one poll interval (≤1 s), and the
//! accept loop joins its session threads (≤500 ms each to notice), so the
//! joins below are bounded by construction.
//!
//! Changing diagnostic logging while Running is allowed but only takes
//! effect at the next (re)start; running sessions keep the options they
//! were started with.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::CommandDispatcher;
use crate::infrastructure::network::discovery::{
    start_discovery_responder, DiscoveryError, HostIdentity,
};
use crate::infrastructure::network::server::{
    start_command_server, ServerError, SessionOptions,
};
use crate::infrastructure::service::shutdown::ShutdownToken;

/// Error type for lifecycle operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Server(#[from] ServerError),
    /// `start()` was called while the services were not fully stopped.
    #[error("cannot start while {0:?}")]
    NotStopped(ServiceState),
}

/// Lifecycle states of the supervised listener pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Static settings the manager needs to bring services up.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Address all sockets bind to.
    pub bind_address: IpAddr,
    /// UDP port the discovery responder listens on.
    pub discovery_port: u16,
    /// Hostname advertised in discovery replies.
    pub hostname: String,
    /// Per-session receive-buffer cap in bytes.
    pub buffer_cap: usize,
}

/// Handles owned while the services are up.
struct RunningServices {
    shutdown: ShutdownToken,
    discovery: std::thread::JoinHandle<()>,
    server: std::thread::JoinHandle<()>,
    command_addr: SocketAddr,
}

/// Supervises the discovery responder and the command transport.
pub struct ServiceManager {
    settings: ServiceSettings,
    dispatcher: Arc<CommandDispatcher>,
    diagnostic_logging: bool,
    state: ServiceState,
    services: Option<RunningServices>,
}

impl ServiceManager {
    /// Creates a manager in the `Stopped` state.
    pub fn new(settings: ServiceSettings, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            settings,
            dispatcher,
            diagnostic_logging: false,
            state: ServiceState::Stopped,
            services: None,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// The transport's actual bound address, while running.
    pub fn command_addr(&self) -> Option<SocketAddr> {
        self.services.as_ref().map(|s| s.command_addr)
    }

    /// Enables or disables per-command diagnostic logging.
    ///
    /// Deferred-apply: a change while `Running` takes effect at the next
    /// `restart()`.
    pub fn set_diagnostic_logging(&mut self, enabled: bool) {
        if self.state == ServiceState::Running && enabled != self.diagnostic_logging {
            info!("diagnostic logging change will apply after restart");
        }
        self.diagnostic_logging = enabled;
    }

    /// Starts both listeners.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotStopped`] when called outside `Stopped`.
    /// Any bind or spawn failure triggers an automatic stop of whatever was
    /// already up, then surfaces as the original error.
    pub fn start(&mut self, command_port: u16) -> Result<(), ServiceError> {
        if self.state != ServiceState::Stopped {
            return Err(ServiceError::NotStopped(self.state));
        }
        self.state = ServiceState::Starting;
        info!(
            "starting services (command port {command_port}, diagnostics {})",
            self.diagnostic_logging
        );

        match self.spawn_services(command_port) {
            Ok(services) => {
                info!("services running on {}", services.command_addr);
                self.services = Some(services);
                self.state = ServiceState::Running;
                Ok(())
            }
            Err(e) => {
                error!("failed to start services: {e}");
                // No half-started state: tear down whatever did come up.
                self.stop();
                Err(e)
            }
        }
    }

    /// Stops both listeners and waits for their threads to exit.
    ///
    /// Calling `stop()` while already `Stopped` is a no-op.
    pub fn stop(&mut self) {
        if self.state == ServiceState::Stopped && self.services.is_none() {
            return;
        }
        self.state = ServiceState::Stopping;
        info!("stopping services");

        if let Some(services) = self.services.take() {
            services.shutdown.trigger();
            // Discovery first: stop advertising before the transport closes.
            if services.discovery.join().is_err() {
                warn!("discovery thread panicked during shutdown");
            }
            if services.server.join().is_err() {
                warn!("server thread panicked during shutdown");
            }
        }

        self.state = ServiceState::Stopped;
        info!("services stopped");
    }

    /// `stop()` followed by `start()` on the same port.
    ///
    /// Safe to call repeatedly: each cycle releases its sockets before the
    /// next bind, so no socket is ever double-bound or leaked.
    pub fn restart(&mut self, command_port: u16) -> Result<(), ServiceError> {
        info!("restarting services");
        self.stop();
        self.start(command_port)
    }

    /// Brings up transport then discovery under one fresh shutdown token,
    /// rolling back the transport if discovery fails.
    fn spawn_services(&self, command_port: u16) -> Result<RunningServices, ServiceError> {
        let shutdown = ShutdownToken::new();

        let (server, command_addr) = start_command_server(
            self.settings.bind_address,
            command_port,
            Arc::clone(&self.dispatcher),
            SessionOptions {
                buffer_cap: self.settings.buffer_cap,
                diagnostic_logging: self.diagnostic_logging,
            },
            shutdown.clone(),
        )?;

        let identity = HostIdentity {
            hostname: self.settings.hostname.clone(),
            command_port: command_addr.port(),
        };
        let discovery = match start_discovery_responder(
            self.settings.bind_address,
            self.settings.discovery_port,
            identity,
            shutdown.clone(),
        ) {
            Ok(handle) => handle,
            Err(e) => {
                shutdown.trigger();
                if server.join().is_err() {
                    warn!("server thread panicked during start rollback");
                }
                return Err(e.into());
            }
        };

        Ok(RunningServices {
            shutdown,
            discovery,
            server,
            command_addr,
        })
    }
}

impl Drop for ServiceManager {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
