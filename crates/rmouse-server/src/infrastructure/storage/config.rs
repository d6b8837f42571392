//! TOML-based configuration persistence for the server.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\RemoteMouse\config.toml`
//! - Linux:    `~/.config/remotemouse/config.toml`
//! - macOS:    `~/Library/Application Support/RemoteMouse/config.toml`
//!
//! An explicit path (the `--config` flag) bypasses the platform lookup via
//! [`load_config_from`].
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the app to work correctly on first run (before a config file exists) and
//! when upgrading from an older config file that is missing newer fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// General server behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Hostname advertised in discovery replies.  Defaults to the machine's
    /// hostname from the environment.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Maximum bytes buffered per session while waiting for a line delimiter.
    #[serde(default = "default_buffer_cap")]
    pub buffer_cap: usize,
    /// Milliseconds to wait for the OS clipboard to settle during a paste.
    #[serde(default = "default_paste_settle_ms")]
    pub paste_settle_ms: u64,
    /// Whether sessions log every decoded command at debug level.
    #[serde(default)]
    pub diagnostic_logging: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Network port and bind-address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// TCP port for the command transport.
    #[serde(default = "default_command_port")]
    pub command_port: u16,
    /// UDP port for LAN discovery probes.
    #[serde(default = "default_discovery_port")]
    pub discovery_port: u16,
    /// IP address to bind all sockets to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_hostname() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "remote-mouse-host".to_string())
}
fn default_buffer_cap() -> usize {
    64 * 1024
}
fn default_paste_settle_ms() -> u64 {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_command_port() -> u16 {
    9998
}
fn default_discovery_port() -> u16 {
    9999
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            buffer_cap: default_buffer_cap(),
            paste_settle_ms: default_paste_settle_ms(),
            diagnostic_logging: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            command_port: default_command_port(),
            discovery_port: default_discovery_port(),
            bind_address: default_bind_address(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config path, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from an explicit path, returning `AppConfig::default()`
/// if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config path.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to an explicit path.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteMouse"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remotemouse"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/RemoteMouse
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteMouse")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_has_expected_ports() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.network.command_port, 9998);
        assert_eq!(cfg.network.discovery_port, 9999);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_server_config_default_limits() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.buffer_cap, 64 * 1024);
        assert_eq!(cfg.paste_settle_ms, 100);
        assert!(!cfg.diagnostic_logging);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_default_hostname_is_never_empty() {
        assert!(!default_hostname().is_empty());
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.network.command_port = 9000;
        cfg.server.hostname = "desk-pc".to_string();
        cfg.server.diagnostic_logging = true;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        // Arrange: both sections absent → everything defaulted
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");

        // Assert
        assert_eq!(cfg.network.command_port, 9998);
        assert_eq!(cfg.server.log_level, "info");
    }

    #[test]
    fn test_deserialize_partial_network_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[network]
command_port = 7000
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.network.command_port, 7000);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.network.discovery_port, 9999);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let bad_toml = "[[[ not valid toml";
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(bad_toml);
        assert!(result.is_err());
    }

    // ── load_config_from ──────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");
        let cfg = load_config_from(&path).expect("absent file must yield defaults");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reads_explicit_path() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("rmouse_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.network.command_port = 12345;
        cfg.server.log_level = "debug".to_string();
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();

        // Act
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded.network.command_port, 12345);
        assert_eq!(loaded.server.log_level, "debug");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_config_to_creates_directories_and_round_trips() {
        let dir = std::env::temp_dir().join(format!("rmouse_save_{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.network.command_port = 4242;
        cfg.server.hostname = "persisted-host".to_string();

        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load back");
        assert_eq!(loaded, cfg);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_rejects_malformed_file() {
        let dir = std::env::temp_dir().join(format!("rmouse_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "command_port = \"not a number").unwrap();

        let result = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir (e.g. a stripped CI env) is also acceptable.
    }
}
