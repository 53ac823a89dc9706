//! All relay protocol message types.
//!
//! Inbound frames carry one of seven event kinds.  Five of them are *input*
//! events that end up in the server's queue; `echo` and `ping` are *control*
//! events the transport answers directly.
//!
//! # Wire shape
//!
//! ```json
//! {"kind":"pointer_move","payload":{"x":0.25,"y":0.75,"timestamp":1712.5},"timestamp":1712.5}
//! {"kind":"key_down","payload":{"key":"a","code":"KeyA"}}
//! ```
//!
//! On the Rust side the `kind` string and the kind-specific `payload` collapse
//! into a single [`Payload`] variant, so an event whose kind disagrees with its
//! payload cannot be constructed.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Event kinds ───────────────────────────────────────────────────────────────

/// The closed set of inbound event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PointerMove,
    PointerDown,
    PointerUp,
    KeyDown,
    KeyUp,
    Echo,
    Ping,
}

impl EventKind {
    /// Every kind, in wire-table order.
    pub const ALL: [EventKind; 7] = [
        EventKind::PointerMove,
        EventKind::PointerDown,
        EventKind::PointerUp,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::Echo,
        EventKind::Ping,
    ];

    /// Returns the snake_case string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::PointerMove => "pointer_move",
            EventKind::PointerDown => "pointer_down",
            EventKind::PointerUp => "pointer_up",
            EventKind::KeyDown => "key_down",
            EventKind::KeyUp => "key_up",
            EventKind::Echo => "echo",
            EventKind::Ping => "ping",
        }
    }

    /// `true` for kinds the transport answers itself instead of queueing.
    pub fn is_control(self) -> bool {
        matches!(self, EventKind::Echo | EventKind::Ping)
    }
}

impl TryFrom<&str> for EventKind {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, ()> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Payload structs ───────────────────────────────────────────────────────────

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        })
    }
}

/// Payload of `pointer_move`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerMotion {
    /// Normalized X coordinate (0.0 = left edge, 1.0 = right edge).
    pub x: f64,
    /// Normalized Y coordinate (0.0 = top edge, 1.0 = bottom edge).
    pub y: f64,
    /// Client-side capture time in milliseconds since the epoch.
    pub timestamp: f64,
}

/// Payload of `pointer_down` and `pointer_up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerButton {
    pub button: MouseButton,
    /// Normalized X coordinate at the press/release location.
    pub x: f64,
    /// Normalized Y coordinate at the press/release location.
    pub y: f64,
}

/// Payload of `key_down` and `key_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStroke {
    /// Logical key value (`KeyboardEvent.key`), e.g. `"a"`, `"Enter"`.
    pub key: String,
    /// Physical key identifier (`KeyboardEvent.code`), e.g. `"KeyA"`.
    pub code: String,
}

/// Payload of `echo`, returned verbatim to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoPayload {
    pub message: String,
}

/// Kind-specific event content.
///
/// This is the closed tagged union the dispatch path matches on; adding a kind
/// here makes every non-exhaustive `match` a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    PointerMove(PointerMotion),
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    KeyDown(KeyStroke),
    KeyUp(KeyStroke),
    Echo(EchoPayload),
    Ping,
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// A validated inbound event.
///
/// Fields are private so an `Event` cannot be mutated after construction; use
/// the accessors or the per-kind constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: Payload,
    timestamp: Option<f64>,
}

impl Event {
    /// Creates an event from a payload and the optional envelope timestamp.
    pub fn new(payload: Payload, timestamp: Option<f64>) -> Self {
        Self { payload, timestamp }
    }

    /// `pointer_move` at normalized `(x, y)` with a zero client timestamp.
    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::new(
            Payload::PointerMove(PointerMotion {
                x,
                y,
                timestamp: 0.0,
            }),
            None,
        )
    }

    pub fn pointer_down(button: MouseButton, x: f64, y: f64) -> Self {
        Self::new(Payload::PointerDown(PointerButton { button, x, y }), None)
    }

    pub fn pointer_up(button: MouseButton, x: f64, y: f64) -> Self {
        Self::new(Payload::PointerUp(PointerButton { button, x, y }), None)
    }

    pub fn key_down(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(
            Payload::KeyDown(KeyStroke {
                key: key.into(),
                code: code.into(),
            }),
            None,
        )
    }

    pub fn key_up(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(
            Payload::KeyUp(KeyStroke {
                key: key.into(),
                code: code.into(),
            }),
            None,
        )
    }

    pub fn echo(message: impl Into<String>) -> Self {
        Self::new(
            Payload::Echo(EchoPayload {
                message: message.into(),
            }),
            None,
        )
    }

    pub fn ping() -> Self {
        Self::new(Payload::Ping, None)
    }

    /// Returns a copy of this event carrying `timestamp` in its envelope.
    pub fn with_timestamp(self, timestamp: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self
        }
    }

    /// The kind implied by the payload variant.
    pub fn kind(&self) -> EventKind {
        match &self.payload {
            Payload::PointerMove(_) => EventKind::PointerMove,
            Payload::PointerDown(_) => EventKind::PointerDown,
            Payload::PointerUp(_) => EventKind::PointerUp,
            Payload::KeyDown(_) => EventKind::KeyDown,
            Payload::KeyUp(_) => EventKind::KeyUp,
            Payload::Echo(_) => EventKind::Echo,
            Payload::Ping => EventKind::Ping,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    /// `true` for `pointer_move`, the only coalescable kind.
    pub fn is_motion(&self) -> bool {
        matches!(self.payload, Payload::PointerMove(_))
    }

    /// `true` for `echo` and `ping`.
    pub fn is_control(&self) -> bool {
        self.kind().is_control()
    }
}

// ── Server → client messages ──────────────────────────────────────────────────

/// All messages the server sends back over the channel.
///
/// # Serde representation
///
/// ```json
/// {"kind":"ack","received":"key_down","queue_size":2}
/// {"kind":"pong","timestamp":1712.5}
/// {"kind":"echo","payload":{"message":"hi"}}
/// {"kind":"error","message":"unknown message kind: \"scroll\""}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    /// An input event was queued; `queue_size` is the backlog size right after.
    Ack {
        received: EventKind,
        queue_size: usize,
    },
    /// Reply to `ping`, echoing the client's envelope timestamp for RTT.
    Pong { timestamp: Option<f64> },
    /// Reply to `echo`.
    Echo { payload: EchoPayload },
    /// The inbound frame was rejected at the parse boundary.
    Error { message: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
