//! Remote Mouse server entry point.
//!
//! Wires configuration, the input dispatcher, and the service manager
//! together, then blocks until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config with CLI overrides
//!  └─ CommandDispatcher       -- shared with every session
//!  └─ ServiceManager::start()
//!       ├─ command transport  (TCP accept thread + session threads)
//!       └─ discovery responder (UDP background thread)
//! ```
//!
//! Exits non-zero when either listener fails to come up.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rmouse_core::Platform;
use rmouse_server::application::{CommandDispatcher, InputBackend};
use rmouse_server::infrastructure::backend::TracingInputBackend;
use rmouse_server::infrastructure::network::discovery::local_ip;
use rmouse_server::infrastructure::service::{ServiceManager, ServiceSettings};
use rmouse_server::infrastructure::storage::{self, AppConfig};

/// Command-line overrides on top of the TOML config.
#[derive(Debug, Default)]
struct CliArgs {
    port: Option<u16>,
    config: Option<PathBuf>,
    log: Option<String>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args.next().context("--port requires a value")?;
                parsed.port = Some(value.parse().context("--port must be a number")?);
            }
            "--config" => {
                let value = args.next().context("--config requires a path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--log" => {
                parsed.log = Some(args.next().context("--log requires a level")?);
            }
            "--help" | "-h" => {
                println!(
                    "usage: rmouse-server [--port PORT] [--config FILE] [--log LEVEL]"
                );
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

fn load_config(args: &CliArgs) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => storage::load_config_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => storage::load_config().context("loading config")?,
    };
    if let Some(port) = args.port {
        config.network.command_port = port;
    }
    if let Some(level) = &args.log {
        config.server.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = load_config(&args)?;

    // Initialise structured logging.  `RUST_LOG` wins over config/CLI.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!("Remote Mouse server starting");

    // A --port/--log override becomes the new stored default, so the next
    // run without flags behaves the same.  Best-effort: a read-only config
    // location must not prevent startup.
    if args.port.is_some() || args.log.is_some() {
        let saved = match &args.config {
            Some(path) => storage::save_config_to(path, &config),
            None => storage::save_config(&config),
        };
        if let Err(e) = saved {
            warn!("could not persist config overrides: {e}");
        }
    }

    let bind_address: IpAddr = config
        .network
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.network.bind_address))?;

    let backend = Arc::new(TracingInputBackend::new()) as Arc<dyn InputBackend>;
    let dispatcher = Arc::new(CommandDispatcher::with_options(
        backend,
        Platform::current(),
        Duration::from_millis(config.server.paste_settle_ms),
    ));

    let mut manager = ServiceManager::new(
        ServiceSettings {
            bind_address,
            discovery_port: config.network.discovery_port,
            hostname: config.server.hostname.clone(),
            buffer_cap: config.server.buffer_cap,
        },
        dispatcher,
    );
    manager.set_diagnostic_logging(config.server.diagnostic_logging);

    manager
        .start(config.network.command_port)
        .context("starting services")?;

    if let Some(addr) = manager.command_addr() {
        info!(
            "listening on {addr} (discovery UDP {}, reachable at {})",
            config.network.discovery_port,
            local_ip()
        );
    }
    info!("Remote Mouse server ready.  Press Ctrl-C to exit.");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutdown signal received");

    manager.stop();
    info!("Remote Mouse server stopped");
    Ok(())
}
