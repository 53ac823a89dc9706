//! relay-server library crate.
//!
//! Receives pointer and keyboard events from browser clients over WebSocket
//! and replays them on this host through an actuator.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (JSON over WebSocket)
//!         │
//! [relay-server]
//!   ├── domain/            ServerConfig, RepeatTiming
//!   ├── application/
//!   │     ├── relay_service   per-connection ingestion, replies
//!   │     ├── event_queue     coalescing buffer (motion slot + FIFO backlog)
//!   │     ├── dispatch        single consumer → Actuator
//!   │     └── key_repeat      per-key repeat timers → Actuator
//!   └── infrastructure/
//!         ├── ws_server       accept loop (tokio-tungstenite)
//!         ├── config_file     TOML settings
//!         └── actuation       LoggingActuator, RecordingActuator
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `relay-core`; it spawns timer tasks
//!   but never opens sockets or files.
//! - `infrastructure` depends on everything else plus `tokio-tungstenite`.
//!
//! # For beginners: where does an event go?
//!
//! A text frame is parsed into an `Event` at the socket.  `ping` and `echo`
//! are answered right there.  Everything else is submitted to the
//! `EventQueue` and acknowledged with the queue size.  The dispatch loop, a
//! separate task, takes events out one at a time and calls the actuator.
//! Pointer motion that piles up while the actuator is busy is collapsed to
//! the most recent position, so the pointer never lags behind the user.

/// Domain layer: pure configuration types.
pub mod domain;

/// Application layer: queueing, dispatch, key repeat, sessions.
pub mod application;

/// Infrastructure layer: WebSocket server, config file, actuators.
pub mod infrastructure;
