//! Remote input relay: entry point.
//!
//! Accepts WebSocket connections from browsers and replays the pointer and
//! keyboard events they send on this host.
//!
//! # Usage
//!
//! ```text
//! relay-server [OPTIONS]
//!
//! Options:
//!   --config <FILE>              TOML config file
//!   --bind <IP>                  Listener address [default: 0.0.0.0]
//!   --port <PORT>                Listener port [default: 9447]
//!   --poll-interval-ms <MS>      Dispatch loop wake-up bound [default: 50]
//!   --repeat-delay-ms <MS>       Key repeat initial delay [default: 500]
//!   --repeat-rate-ms <MS>        Key repeat interval [default: 33]
//!   --log-level <FILTER>         Log filter when RUST_LOG is unset [default: info]
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then the config file, then CLI arguments or their
//! environment variables.  `RUST_LOG` beats every log level setting.
//!
//! | Variable         | Flag                 |
//! |------------------|----------------------|
//! | `RELAY_CONFIG`   | `--config`           |
//! | `RELAY_BIND`     | `--bind`             |
//! | `RELAY_PORT`     | `--port`             |
//! | `RELAY_LOG`      | `--log-level`        |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_server::application::RelayService;
use relay_server::domain::ServerConfig;
use relay_server::infrastructure::actuation::LoggingActuator;
use relay_server::infrastructure::config_file::load_config;
use relay_server::infrastructure::WsServer;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote pointer and keyboard relay.
///
/// Every option is optional; an unset option keeps the value from the config
/// file, or the built-in default when there is no file.
#[derive(Debug, Parser)]
#[command(
    name = "relay-server",
    about = "Relays browser pointer and keyboard events to this host",
    version
)]
struct Cli {
    /// TOML config file.
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// IP address to bind the WebSocket listener to.
    #[arg(long, env = "RELAY_BIND")]
    bind: Option<IpAddr>,

    /// WebSocket listener port.
    #[arg(long, env = "RELAY_PORT")]
    port: Option<u16>,

    /// Upper bound on how long the dispatch loop waits on an empty queue.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: Option<u64>,

    /// Delay before a held key starts repeating.
    #[arg(long)]
    repeat_delay_ms: Option<u64>,

    /// Interval between repeats of a held key.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    repeat_rate_ms: Option<u64>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`,
    /// `relay_server=trace`).
    #[arg(long, env = "RELAY_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file if one was named, then applies CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or is invalid.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        let ip = self.bind.unwrap_or_else(|| config.bind_addr.ip());
        let port = self.port.unwrap_or_else(|| config.bind_addr.port());
        config.bind_addr = SocketAddr::new(ip, port);

        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.repeat_delay_ms {
            config.repeat.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.repeat_rate_ms {
            config.repeat.rate = Duration::from_millis(ms);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// # What happens at startup
///
/// 1. CLI arguments are parsed and merged with the config file.
/// 2. `tracing_subscriber` is initialised; `RUST_LOG` wins over the
///    configured level.
/// 3. The relay service and its dispatch loop task are created.
/// 4. A Ctrl+C handler clears the shared `running` flag.
/// 5. The WebSocket accept loop runs until the flag is cleared, then the
///    dispatch loop is joined and every repeat timer is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_server_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        bind = %config.bind_addr,
        poll_interval = ?config.poll_interval,
        repeat_delay = ?config.repeat.initial_delay,
        repeat_rate = ?config.repeat.rate,
        "relay server starting"
    );

    let service = Arc::new(RelayService::new(
        config.clone(),
        Arc::new(LoggingActuator::default()),
    ));

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::SeqCst);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let dispatcher = tokio::spawn(service.dispatch_loop().run(Arc::clone(&running)));

    // ── Main server loop ───────────────────────────────────────────────────────
    let served = match WsServer::bind(config.bind_addr).await {
        Ok(server) => server.run(Arc::clone(&service), Arc::clone(&running)).await,
        Err(e) => Err(e),
    };

    running.store(false, Ordering::SeqCst);
    if let Err(e) = dispatcher.await {
        tracing::error!("dispatch loop task failed: {e}");
    }
    service.shutdown();

    served?;
    info!("relay server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_arguments_yields_default_config() {
        // Arrange
        let cli = Cli::parse_from(["relay-server"]);

        // Act
        let config = cli.into_server_config().unwrap();

        // Assert
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_port_override_keeps_default_ip() {
        let cli = Cli::parse_from(["relay-server", "--port", "9999"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9999".parse().unwrap());
    }

    #[test]
    fn test_bind_override_keeps_default_port() {
        let cli = Cli::parse_from(["relay-server", "--bind", "127.0.0.1"]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9447".parse().unwrap());
    }

    #[test]
    fn test_timing_overrides() {
        let cli = Cli::parse_from([
            "relay-server",
            "--poll-interval-ms",
            "10",
            "--repeat-delay-ms",
            "250",
            "--repeat-rate-ms",
            "20",
        ]);
        let config = cli.into_server_config().unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.repeat.initial_delay, Duration::from_millis(250));
        assert_eq!(config.repeat.rate, Duration::from_millis(20));
    }

    #[test]
    fn test_zero_repeat_rate_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["relay-server", "--repeat-rate-ms", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_bind_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["relay-server", "--bind", "localhost:80"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind_address = \"127.0.0.1\"\nport = 7000\n\n[key_repeat]\nrate_ms = 50"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        // Act
        let cli = Cli::parse_from(["relay-server", "--config", &path, "--port", "7001"]);
        let config = cli.into_server_config().unwrap();

        // Assert: file value kept where the CLI is silent
        assert_eq!(config.bind_addr, "127.0.0.1:7001".parse().unwrap());
        assert_eq!(config.repeat.rate, Duration::from_millis(50));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["relay-server", "--config", "/nonexistent/relay.toml"]);
        assert!(cli.into_server_config().is_err());
    }
}
