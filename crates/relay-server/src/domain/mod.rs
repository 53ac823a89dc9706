//! Domain layer for relay-server.
//!
//! Pure runtime settings with no I/O.  Wire messages and events live in the
//! `relay-core` crate because they are shared with anything that speaks the
//! protocol; this layer only holds what is specific to running the server.
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or `WebSocket` types
//! - File I/O or environment variable reading

pub mod config;

pub use config::{RepeatTiming, ServerConfig};
