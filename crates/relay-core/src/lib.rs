//! # relay-core
//!
//! Shared library for the remote input relay containing the message model,
//! the JSON codec that validates inbound frames, and the logical key table.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or network
//! sockets.  Everything in it is plain data plus pure functions, which keeps
//! the validation boundary easy to test in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! A remote client (usually a browser tab) captures pointer and keyboard
//! activity and streams it to the relay server as small JSON messages.  The
//! server buffers those events, coalesces redundant pointer motion, and replays
//! them on the local machine through an *actuator*.
//!
//! This crate (`relay-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – What travels over the wire.  Every inbound frame is parsed
//!   into a typed [`Event`] (a closed tagged union over the seven event kinds)
//!   or rejected with a [`ProtocolError`] before it can reach the server's queue.
//!   Replies from the server are modelled as [`ServerMessage`].
//!
//! - **`keymap`** – Translates the logical key values sent by browsers
//!   (`KeyboardEvent.key`, e.g. `"Enter"` or `"a"`) into a typed [`LogicalKey`]
//!   that actuator back-ends can match on exhaustively.

pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::Event` instead of `relay_core::protocol::messages::Event`.
pub use keymap::{LogicalKey, NamedKey};
pub use protocol::codec::{encode_server_message, parse_message, ProtocolError};
pub use protocol::messages::{
    EchoPayload, Event, EventKind, KeyStroke, MouseButton, Payload, PointerButton, PointerMotion,
    ServerMessage,
};
