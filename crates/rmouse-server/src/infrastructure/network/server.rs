//! TCP command transport: accept loop and per-session connection handling.
//!
//! One thread accepts connections; each accepted connection gets its own
//! session thread running the read loop.  The listener is nonblocking and
//! polled against the [`ShutdownToken`] so `stop()` never waits on a
//! blocking `accept`; session reads use a 500 ms timeout for the same
//! reason.  Sessions are joined when the accept loop exits, so a stopped
//! server leaks neither sockets nor threads.
//!
//! A session owns a [`StreamDecoder`].  Each read chunk is fed in, every
//! decoded command batch goes synchronously to the dispatcher (a slow
//! backend call backpressures only this session's reads), malformed lines
//! are logged and skipped, and a receive-buffer overflow tears the session
//! down.  On every exit path (clean EOF, read error, overflow, shutdown) the
//! handler invokes the dispatcher's input-state reset before the session
//! ends.  A dropped connection must never leave a button or key stuck down.

use std::io::Read;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use rmouse_core::StreamDecoder;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::CommandDispatcher;
use crate::infrastructure::service::shutdown::ShutdownToken;

/// How long the accept loop sleeps when no connection is pending.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Session read timeout; bounds how long a stop request goes unnoticed.
const READ_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Error type for the command server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The TCP listener could not be bound.
    #[error("failed to bind command listener on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The accept thread could not be spawned.
    #[error("failed to spawn accept thread: {0}")]
    Spawn(std::io::Error),
}

/// Tuning knobs the lifecycle manager passes through from configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Receive-buffer cap per session, in bytes.
    pub buffer_cap: usize,
    /// When set, every decoded batch is debug-logged.
    pub diagnostic_logging: bool,
}

/// How a session ended; used for logging and tests.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Peer closed the connection (EOF).
    Clean,
    /// Read error or session-fatal decode error.
    Error,
    /// Server-side shutdown.
    Shutdown,
}

/// Binds the command listener and spawns the accept thread.
///
/// Returns the join handle and the actual bound address (relevant when the
/// configured port is 0).
///
/// # Errors
///
/// Returns [`ServerError::BindFailed`] if the listener cannot be bound.
pub fn start_command_server(
    bind_address: IpAddr,
    port: u16,
    dispatcher: Arc<CommandDispatcher>,
    options: SessionOptions,
    shutdown: ShutdownToken,
) -> Result<(std::thread::JoinHandle<()>, SocketAddr), ServerError> {
    let addr = SocketAddr::new(bind_address, port);
    let listener =
        TcpListener::bind(addr).map_err(|source| ServerError::BindFailed { addr, source })?;
    let local_addr = listener.local_addr().unwrap_or(addr);
    listener
        .set_nonblocking(true)
        .map_err(|source| ServerError::BindFailed { addr, source })?;

    let handle = std::thread::Builder::new()
        .name("rmouse-accept".to_string())
        .spawn(move || accept_loop(listener, dispatcher, options, shutdown))
        .map_err(ServerError::Spawn)?;

    info!("command server listening on TCP {local_addr}");
    Ok((handle, local_addr))
}

/// Accepts connections until shutdown, then joins every session thread.
fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<CommandDispatcher>,
    options: SessionOptions,
    shutdown: ShutdownToken,
) {
    let active_sessions = Arc::new(AtomicUsize::new(0));
    let mut session_handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

    while !shutdown.is_triggered() {
        // Reap sessions that already ended so the handle list stays
        // proportional to live sessions, not to total reconnects.
        session_handles.retain(|handle| !handle.is_finished());

        match listener.accept() {
            Ok((stream, peer)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let options = options.clone();
                let shutdown = shutdown.clone();
                let counter = Arc::clone(&active_sessions);
                counter.fetch_add(1, Ordering::Relaxed);
                info!(
                    "client connected from {peer} ({} active)",
                    counter.load(Ordering::Relaxed)
                );
                let spawned = std::thread::Builder::new()
                    .name(format!("rmouse-session-{peer}"))
                    .spawn(move || {
                        let end = session_loop(stream, peer, &dispatcher, &options, &shutdown);
                        // Mandatory: release anything the client left latched,
                        // on every exit path.
                        dispatcher.reset();
                        counter.fetch_sub(1, Ordering::Relaxed);
                        info!("client {peer} disconnected ({end:?})");
                    });
                match spawned {
                    Ok(handle) => session_handles.push(handle),
                    Err(e) => {
                        error!("failed to spawn session thread for {peer}: {e}");
                        active_sessions.fetch_sub(1, Ordering::Relaxed);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) => {
                error!("accept error: {e}");
                std::thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }

    // Sessions observe the same token within one read timeout.
    for handle in session_handles {
        if let Err(e) = handle.join() {
            error!("session thread panicked: {e:?}");
        }
    }
    info!("command server stopped");
}

/// The per-connection read loop.  Returns how the session ended; the caller
/// performs the input-state reset.
fn session_loop(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: &CommandDispatcher,
    options: &SessionOptions,
    shutdown: &ShutdownToken,
) -> SessionEnd {
    // The accepted socket may inherit the listener's nonblocking flag on
    // some platforms; the read loop wants timeout-based blocking reads.
    if let Err(e) = stream.set_nonblocking(false) {
        warn!("could not switch {peer} to blocking mode: {e}");
    }
    // Latency beats throughput for input events: no send coalescing.
    if let Err(e) = stream.set_nodelay(true) {
        warn!("could not disable Nagle for {peer}: {e}");
    }
    if let Err(e) = stream.set_read_timeout(Some(READ_POLL_TIMEOUT)) {
        warn!("could not set read timeout for {peer}: {e}");
    }

    let mut decoder = StreamDecoder::with_cap(options.buffer_cap);
    let mut buf = [0u8; 4096];

    loop {
        if shutdown.is_triggered() {
            return SessionEnd::Shutdown;
        }

        let n = match stream.read(&mut buf) {
            Ok(0) => return SessionEnd::Clean,
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(e) => {
                warn!("read error from {peer}: {e}");
                return SessionEnd::Error;
            }
        };

        let results = match decoder.feed(&buf[..n]) {
            Ok(results) => results,
            // Overflow means a client streaming without delimiters; cut it
            // off rather than grow the buffer without bound.
            Err(e) => {
                error!("session-fatal decode error from {peer}: {e}");
                return SessionEnd::Error;
            }
        };

        let mut batch = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(command) => batch.push(command),
                // A single bad frame never terminates the session.
                Err(e) => warn!("dropping malformed command from {peer}: {e}"),
            }
        }

        if options.diagnostic_logging && !batch.is_empty() {
            debug!("dispatching {} command(s) from {peer}: {batch:?}", batch.len());
        }
        if !batch.is_empty() {
            dispatcher.dispatch_batch(&batch);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
