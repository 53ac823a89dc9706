//! Application layer for relay-server.
//!
//! Knows *what* happens to an event between the socket and the host, and
//! delegates *how* input is injected to an [`Actuator`] supplied from outside.
//!
//! # Responsibilities
//!
//! - Buffering events with motion coalescing (`event_queue`)
//! - Draining the buffer into the actuator (`dispatch`)
//! - Synthesizing repeats for held keys (`key_repeat`)
//! - Per-connection ingestion and replies (`relay_service`)
//!
//! # What does NOT belong here?
//!
//! - Sockets, WebSocket framing, or the accept loop (infrastructure)
//! - OS input APIs (infrastructure, behind the `Actuator` trait)

pub mod actuator;
pub mod dispatch;
pub mod event_queue;
pub mod key_repeat;
pub mod relay_service;

pub use actuator::{ActuationError, Actuator};
pub use dispatch::{DispatchLoop, DispatchStats};
pub use event_queue::EventQueue;
pub use key_repeat::KeyRepeatManager;
pub use relay_service::{ClientSession, RelayService};
