//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for runtime settings.  It is
//! assembled in `main.rs` from defaults, an optional TOML file
//! (`infrastructure::config_file`) and command-line overrides, in that order.
//! Nothing in here reads the environment or the filesystem.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default WebSocket port.
pub const DEFAULT_PORT: u16 = 9447;

/// Timing for synthesized key repeats.
///
/// A held key produces its first synthesized press `initial_delay` after the
/// physical press, then one more every `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTiming {
    pub initial_delay: Duration,
    pub rate: Duration,
}

impl Default for RepeatTiming {
    /// 500 ms delay, 33 ms rate (about 30 repeats per second).
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            rate: Duration::from_millis(33),
        }
    }
}

/// All runtime configuration for the relay server.
///
/// # Example
///
/// ```rust
/// use relay_server::domain::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 9447);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.  `0.0.0.0` accepts LAN
    /// clients; `127.0.0.1` restricts the relay to local browsers.
    pub bind_addr: SocketAddr,

    /// Upper bound on how long the dispatch loop parks on an empty queue
    /// before re-checking the shutdown flag.
    pub poll_interval: Duration,

    /// Key repeat delay and rate.
    pub repeat: RepeatTiming,

    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    /// | Field           | Default          |
    /// |-----------------|------------------|
    /// | bind_addr       | `0.0.0.0:9447`   |
    /// | poll_interval   | 50 ms            |
    /// | repeat          | 500 ms / 33 ms   |
    /// | log_level       | `info`           |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            poll_interval: Duration::from_millis(50),
            repeat: RepeatTiming::default(),
            log_level: "info".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
