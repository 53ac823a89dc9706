//! JSON codec: the parse/validation boundary for inbound frames.
//!
//! Wire format (one JSON object per WebSocket text frame):
//! ```text
//! { "kind": <enum string>, "payload": { ...kind-specific... }, "timestamp": <float, optional> }
//! ```
//!
//! Anything that fails here (unknown kind, missing or mistyped payload field,
//! coordinate outside `[0, 1]`) is reported as a [`ProtocolError`] and never
//! becomes an [`Event`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::protocol::messages::{
    EchoPayload, Event, EventKind, KeyStroke, Payload, PointerButton, PointerMotion,
    ServerMessage,
};

/// Errors that can occur while parsing inbound frames or encoding replies.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not a JSON object of the expected envelope shape.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The `kind` field names no known event kind.
    #[error("unknown message kind: {0:?}")]
    UnknownKind(String),

    /// The payload is missing, or a required field is missing or mistyped.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: EventKind, reason: String },

    /// A normalized coordinate lies outside `[0, 1]`.
    #[error("{kind} field `{field}` out of range [0, 1]: {value}")]
    CoordinateOutOfRange {
        kind: EventKind,
        field: &'static str,
        value: f64,
    },

    /// A reply could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// Envelope as it appears on the wire, before kind-specific validation.
#[derive(Deserialize)]
struct RawMessage {
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parses and validates one inbound text frame.
///
/// # Errors
///
/// Returns [`ProtocolError`] when the frame is not valid JSON, names an unknown
/// kind, lacks a required payload field, or carries an out-of-range coordinate.
///
/// # Examples
///
/// ```rust
/// use relay_core::protocol::{parse_message, EventKind};
///
/// let event = parse_message(r#"{"kind":"key_down","payload":{"key":"a","code":"KeyA"}}"#).unwrap();
/// assert_eq!(event.kind(), EventKind::KeyDown);
/// ```
pub fn parse_message(text: &str) -> Result<Event, ProtocolError> {
    let raw: RawMessage =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let kind = EventKind::try_from(raw.kind.as_str())
        .map_err(|()| ProtocolError::UnknownKind(raw.kind.clone()))?;

    let payload = match kind {
        EventKind::PointerMove => {
            let motion: PointerMotion = payload_as(kind, raw.payload)?;
            check_unit(kind, "x", motion.x)?;
            check_unit(kind, "y", motion.y)?;
            Payload::PointerMove(motion)
        }
        EventKind::PointerDown | EventKind::PointerUp => {
            let button: PointerButton = payload_as(kind, raw.payload)?;
            check_unit(kind, "x", button.x)?;
            check_unit(kind, "y", button.y)?;
            if kind == EventKind::PointerDown {
                Payload::PointerDown(button)
            } else {
                Payload::PointerUp(button)
            }
        }
        EventKind::KeyDown => Payload::KeyDown(payload_as::<KeyStroke>(kind, raw.payload)?),
        EventKind::KeyUp => Payload::KeyUp(payload_as::<KeyStroke>(kind, raw.payload)?),
        EventKind::Echo => Payload::Echo(payload_as::<EchoPayload>(kind, raw.payload)?),
        // Ping carries nothing; any payload is ignored.
        EventKind::Ping => Payload::Ping,
    };

    Ok(Event::new(payload, raw.timestamp))
}

/// Serializes a reply into a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_server_message(msg: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn payload_as<T: DeserializeOwned>(
    kind: EventKind,
    payload: Option<serde_json::Value>,
) -> Result<T, ProtocolError> {
    let value = match payload {
        Some(serde_json::Value::Null) | None => {
            return Err(ProtocolError::InvalidPayload {
                kind,
                reason: "missing payload".to_string(),
            })
        }
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

fn check_unit(kind: EventKind, field: &'static str, value: f64) -> Result<(), ProtocolError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ProtocolError::CoordinateOutOfRange { kind, field, value })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::MouseButton;

    #[test]
    fn test_parse_pointer_move_with_envelope_timestamp() {
        // Arrange
        let json = r#"{"kind":"pointer_move","payload":{"x":0.25,"y":0.75,"timestamp":1000.0},"timestamp":1001.5}"#;

        // Act
        let event = parse_message(json).unwrap();

        // Assert
        assert_eq!(event.timestamp(), Some(1001.5));
        match event.payload() {
            Payload::PointerMove(m) => {
                assert_eq!((m.x, m.y, m.timestamp), (0.25, 0.75, 1000.0));
            }
            other => panic!("expected PointerMove, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_accepts_integer_coordinates_on_the_boundary() {
        let json = r#"{"kind":"pointer_move","payload":{"x":0,"y":1,"timestamp":0}}"#;
        let event = parse_message(json).unwrap();
        assert!(event.is_motion());
        assert_eq!(event.timestamp(), None);
    }

    #[test]
    fn test_parse_pointer_down_and_up() {
        let down = parse_message(
            r#"{"kind":"pointer_down","payload":{"button":"right","x":0.5,"y":0.5}}"#,
        )
        .unwrap();
        let up =
            parse_message(r#"{"kind":"pointer_up","payload":{"button":"left","x":0.1,"y":0.9}}"#)
                .unwrap();

        assert_eq!(down, Event::pointer_down(MouseButton::Right, 0.5, 0.5));
        assert_eq!(up, Event::pointer_up(MouseButton::Left, 0.1, 0.9));
    }

    #[test]
    fn test_parse_key_events() {
        let down = parse_message(r#"{"kind":"key_down","payload":{"key":"Enter","code":"Enter"}}"#)
            .unwrap();
        let up = parse_message(r#"{"kind":"key_up","payload":{"key":"a","code":"KeyA"}}"#).unwrap();
        assert_eq!(down, Event::key_down("Enter", "Enter"));
        assert_eq!(up, Event::key_up("a", "KeyA"));
    }

    #[test]
    fn test_parse_echo_and_ping() {
        let echo = parse_message(r#"{"kind":"echo","payload":{"message":"hi"}}"#).unwrap();
        let ping = parse_message(r#"{"kind":"ping","timestamp":12.0}"#).unwrap();
        assert_eq!(echo, Event::echo("hi"));
        assert_eq!(ping, Event::ping().with_timestamp(12.0));
    }

    #[test]
    fn test_ping_ignores_payload_content() {
        let ping = parse_message(r#"{"kind":"ping","payload":{"anything":true}}"#).unwrap();
        assert_eq!(ping.kind(), EventKind::Ping);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = parse_message(r#"{"kind":"scroll","payload":{}}"#);
        assert_eq!(result, Err(ProtocolError::UnknownKind("scroll".to_string())));
    }

    #[test]
    fn test_missing_kind_is_malformed() {
        let result = parse_message(r#"{"payload":{"key":"a","code":"KeyA"}}"#);
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_message("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_payload_is_rejected() {
        let result = parse_message(r#"{"kind":"key_down"}"#);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidPayload {
                kind: EventKind::KeyDown,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_payload_field_is_rejected() {
        // `code` is required for key events
        let result = parse_message(r#"{"kind":"key_up","payload":{"key":"a"}}"#);
        match result {
            Err(ProtocolError::InvalidPayload { kind, reason }) => {
                assert_eq!(kind, EventKind::KeyUp);
                assert!(reason.contains("code"), "reason should name the field: {reason}");
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_button_is_rejected() {
        let result = parse_message(
            r#"{"kind":"pointer_down","payload":{"button":"back","x":0.5,"y":0.5}}"#,
        );
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidPayload {
                kind: EventKind::PointerDown,
                ..
            })
        ));
    }

    #[test]
    fn test_out_of_range_coordinate_is_rejected() {
        let result =
            parse_message(r#"{"kind":"pointer_move","payload":{"x":1.5,"y":0.5,"timestamp":0}}"#);
        assert_eq!(
            result,
            Err(ProtocolError::CoordinateOutOfRange {
                kind: EventKind::PointerMove,
                field: "x",
                value: 1.5,
            })
        );
    }

    #[test]
    fn test_negative_coordinate_is_rejected_for_buttons() {
        let result = parse_message(
            r#"{"kind":"pointer_up","payload":{"button":"left","x":0.5,"y":-0.01}}"#,
        );
        assert!(matches!(
            result,
            Err(ProtocolError::CoordinateOutOfRange { field: "y", .. })
        ));
    }

    #[test]
    fn test_encode_ack() {
        let text = encode_server_message(&ServerMessage::Ack {
            received: EventKind::PointerMove,
            queue_size: 1,
        })
        .unwrap();
        assert_eq!(text, r#"{"kind":"ack","received":"pointer_move","queue_size":1}"#);
    }

    #[test]
    fn test_encode_pong_without_timestamp_emits_null() {
        let text = encode_server_message(&ServerMessage::Pong { timestamp: None }).unwrap();
        assert_eq!(text, r#"{"kind":"pong","timestamp":null}"#);
    }
}
