//! Infrastructure layer for relay-server.
//!
//! # Responsibilities
//!
//! - Binding the WebSocket listener and running one task per connection
//! - Reading the optional TOML config file
//! - Concrete `Actuator` implementations
//!
//! # What does NOT belong here?
//!
//! - Queueing, ordering, or repeat logic (that is the application layer)
//! - Wire message definitions (that is `relay-core`)

pub mod actuation;
pub mod config_file;
pub mod ws_server;

pub use ws_server::WsServer;
