//! TOML configuration file support.
//!
//! The file is optional; every key in it is optional too.  A missing key keeps
//! its default, so a file can override just the one setting it cares about:
//!
//! ```toml
//! [server]
//! bind_address = "127.0.0.1"
//! port = 9447
//! log_level = "debug"
//!
//! [dispatch]
//! poll_interval_ms = 50
//!
//! [key_repeat]
//! initial_delay_ms = 500
//! rate_ms = 33
//! ```
//!
//! # Serde default values
//!
//! Each field carries `#[serde(default = "...")]` and each section
//! `#[serde(default)]`, so the schema structs deserialize from an empty
//! document.  Validation (address parsing, non-zero rate) happens when the
//! schema is converted into a [`ServerConfig`].

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{RepeatTiming, ServerConfig, DEFAULT_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

// ── File schema ───────────────────────────────────────────────────────────────

/// Top-level layout of the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub dispatch: DispatchSection,
    #[serde(default)]
    pub key_repeat: KeyRepeatSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRepeatSection {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_rate_ms")]
    pub rate_ms: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    50
}
fn default_initial_delay_ms() -> u64 {
    500
}
fn default_rate_ms() -> u64 {
    33
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for KeyRepeatSection {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            rate_ms: default_rate_ms(),
        }
    }
}

impl TryFrom<ConfigFile> for ServerConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let ip: IpAddr =
            file.server
                .bind_address
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                    field: "server.bind_address",
                    reason: e.to_string(),
                })?;
        if file.dispatch.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if file.key_repeat.rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "key_repeat.rate_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(ip, file.server.port),
            poll_interval: Duration::from_millis(file.dispatch.poll_interval_ms),
            repeat: RepeatTiming {
                initial_delay: Duration::from_millis(file.key_repeat.initial_delay_ms),
                rate: Duration::from_millis(file.key_repeat.rate_ms),
            },
            log_level: file.server.log_level,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses TOML text into a validated [`ServerConfig`].
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML and
/// [`ConfigError::InvalidValue`] for values that fail validation.
pub fn parse_config(text: &str) -> Result<ServerConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(text)?;
    ServerConfig::try_from(file)
}

/// Reads and validates the config file at `path`.
///
/// An explicitly named file that does not exist is an error, not a silent
/// fallback to defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
/// [`parse_config`].
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let text = "[key_repeat]\nrate_ms = 50\n";

        // Act
        let config = parse_config(text).unwrap();

        // Assert
        assert_eq!(config.repeat.rate, Duration::from_millis(50));
        assert_eq!(config.repeat.initial_delay, Duration::from_millis(500));
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_full_document() {
        let text = r#"
            [server]
            bind_address = "127.0.0.1"
            port = 8080
            log_level = "debug"

            [dispatch]
            poll_interval_ms = 20

            [key_repeat]
            initial_delay_ms = 250
            rate_ms = 40
        "#;

        let config = parse_config(text).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.poll_interval, Duration::from_millis(20));
        assert_eq!(config.repeat.initial_delay, Duration::from_millis(250));
        assert_eq!(config.repeat.rate, Duration::from_millis(40));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let result = parse_config("[server]\nbind_address = \"not-an-ip\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "server.bind_address",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_repeat_rate_is_rejected() {
        let result = parse_config("[key_repeat]\nrate_ms = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "key_repeat.rate_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let result = parse_config("[dispatch]\npoll_interval_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = parse_config("[server\nport = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result = parse_config("[server]\nport = \"eighty\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_reads_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9999").unwrap();

        // Act
        let config = load_config(file.path()).unwrap();

        // Assert
        assert_eq!(config.bind_addr.port(), 9999);
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let result = load_config(&path);

        match result {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_schema_round_trips_through_toml() {
        let text = toml::to_string(&ConfigFile::default()).unwrap();
        assert_eq!(parse_config(&text).unwrap(), ServerConfig::default());
    }
}
