//! UDP broadcast-based host discovery.
//!
//! The phone client has no way to know the host's address, so it broadcasts
//! a probe to the LAN.  The responder binds a UDP socket on the discovery
//! port and, for every datagram whose payload is exactly the ASCII token
//! `SCAN_REMOTE_MOUSE`, sends back a small JSON object:
//!
//! ```json
//! {"hostname": "my-desktop", "ip": "192.168.1.23", "port": 9998}
//! ```
//!
//! where `port` is the TCP command port the client should connect to.
//! Datagrams carrying anything else are silently ignored: the discovery
//! port is shared broadcast space and foreign traffic is expected there.
//! The responder is stateless and answers every probe, repeated or not.
//!
//! # Read timeout
//!
//! The socket is configured with a 500 ms read timeout.  On each timeout the
//! loop checks its [`ShutdownToken`]; a stop request is therefore observed
//! within one second at the outside.

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::infrastructure::service::shutdown::ShutdownToken;

/// The exact probe payload the phone client broadcasts.
pub const DISCOVERY_TOKEN: &[u8] = b"SCAN_REMOTE_MOUSE";

/// How long `recv_from` blocks before the loop re-checks the shutdown token.
const POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Error type for discovery responder operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The responder thread could not be spawned.
    #[error("failed to spawn discovery thread: {0}")]
    Spawn(std::io::Error),
}

/// The reply sent to a valid probe.
#[derive(Debug, Serialize)]
struct DiscoveryReply<'a> {
    hostname: &'a str,
    ip: String,
    port: u16,
}

/// Identity advertised in discovery replies.
#[derive(Debug, Clone)]
pub struct HostIdentity {
    /// Hostname shown in the phone's host picker.
    pub hostname: String,
    /// TCP command port clients should connect to.
    pub command_port: u16,
}

/// Binds the discovery socket and spawns the responder thread.
///
/// Returns the join handle so the lifecycle manager can wait for the loop
/// to exit after triggering `shutdown`.
///
/// # Errors
///
/// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound.
pub fn start_discovery_responder(
    bind_address: IpAddr,
    discovery_port: u16,
    identity: HostIdentity,
    shutdown: ShutdownToken,
) -> Result<std::thread::JoinHandle<()>, DiscoveryError> {
    let addr = SocketAddr::new(bind_address, discovery_port);
    let socket =
        UdpSocket::bind(addr).map_err(|source| DiscoveryError::BindFailed { addr, source })?;
    socket.set_read_timeout(Some(POLL_TIMEOUT)).ok();

    let handle = std::thread::Builder::new()
        .name("rmouse-discovery".to_string())
        .spawn(move || discovery_loop(socket, identity, shutdown))
        .map_err(DiscoveryError::Spawn)?;

    info!("discovery responder listening on UDP {addr}");
    Ok(handle)
}

/// The receive loop executed on the discovery thread.
fn discovery_loop(socket: UdpSocket, identity: HostIdentity, shutdown: ShutdownToken) {
    let mut buf = [0u8; 1024];

    while !shutdown.is_triggered() {
        let (len, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if is_timeout_error(&e) => continue,
            Err(e) => {
                error!("discovery recv error: {e}");
                continue;
            }
        };

        if &buf[..len] != DISCOVERY_TOKEN {
            // Foreign broadcast traffic; deliberately no reply.
            debug!("ignoring non-probe datagram from {src} ({len} bytes)");
            continue;
        }

        debug!("discovery probe from {src}");
        send_reply(&socket, src, &identity);
    }

    info!("discovery responder stopped");
}

/// Sends the host identity reply back to `dest`.
fn send_reply(socket: &UdpSocket, dest: SocketAddr, identity: &HostIdentity) {
    let reply = DiscoveryReply {
        hostname: &identity.hostname,
        ip: local_ip().to_string(),
        port: identity.command_port,
    };
    match serde_json::to_vec(&reply) {
        Ok(bytes) => {
            if let Err(e) = socket.send_to(&bytes, dest) {
                warn!("failed to send discovery reply to {dest}: {e}");
            }
        }
        Err(e) => error!("failed to encode discovery reply: {e}"),
    }
}

/// Determines the LAN-facing local IP.
///
/// Connecting a UDP socket does not send any packets; it only asks the OS
/// which interface it would route through, whose address is then readable
/// via `local_addr`.  Falls back to loopback when the host has no route.
pub fn local_ip() -> IpAddr {
    let fallback: IpAddr = [127, 0, 0, 1].into();
    let Ok(socket) = UdpSocket::bind("0.0.0.0:0") else {
        return fallback;
    };
    if socket.connect("8.8.8.8:1").is_err() {
        return fallback;
    }
    socket.local_addr().map(|a| a.ip()).unwrap_or(fallback)
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
