//! Event reports accepted on `POST /update`.
//!
//! Reporters send a JSON object whose `event` key selects the kind:
//!
//! | `event` | fields |
//! |---------|--------|
//! | `producer_connected` | `id` |
//! | `producer_disconnected` | `id` |
//! | `consumer_connected` | `id` |
//! | `consumer_disconnected` | `id` |
//! | `message_sent` | `from?`, `to?`, `timestamp?` |
//!
//! Any other `event` value, or a missing one, decodes to
//! [`MonitorEvent::Unrecognized`] and is ignored downstream. Optional
//! `message_sent` fields are defaulted here, at the boundary, so the state
//! store only ever sees complete records.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::model::{DEFAULT_FROM, DEFAULT_TO, MessageEvent, default_timestamp};

/// Errors raised while decoding an `/update` body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid JSON.
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is valid JSON but not an object.
    #[error("event report must be a JSON object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("{event} event is missing required field `{field}`")]
    MissingField {
        /// The event kind being decoded.
        event: &'static str,
        /// The absent field.
        field: &'static str,
    },

    /// A field is present with the wrong JSON type.
    #[error("field `{field}` must be a {expected}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// The JSON type the field must have.
        expected: &'static str,
    },
}

/// A decoded event report.
///
/// Serializes back to the wire shape (`{"event": "...", ...}`) so applied
/// events can be relayed to `WebSocket` subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A producer connected to the broker.
    ProducerConnected {
        /// Producer id.
        id: String,
    },
    /// A producer disconnected from the broker.
    ProducerDisconnected {
        /// Producer id.
        id: String,
    },
    /// A consumer connected to the broker.
    ConsumerConnected {
        /// Consumer id.
        id: String,
    },
    /// A consumer disconnected from the broker.
    ConsumerDisconnected {
        /// Consumer id.
        id: String,
    },
    /// A message passed through the system.
    MessageSent(MessageEvent),
    /// Unknown or missing `event` kind. Carries the kind when it was a string.
    #[serde(skip)]
    Unrecognized(Option<String>),
}

impl MonitorEvent {
    /// Wire name of [`MonitorEvent::ProducerConnected`].
    pub const PRODUCER_CONNECTED: &'static str = "producer_connected";
    /// Wire name of [`MonitorEvent::ProducerDisconnected`].
    pub const PRODUCER_DISCONNECTED: &'static str = "producer_disconnected";
    /// Wire name of [`MonitorEvent::ConsumerConnected`].
    pub const CONSUMER_CONNECTED: &'static str = "consumer_connected";
    /// Wire name of [`MonitorEvent::ConsumerDisconnected`].
    pub const CONSUMER_DISCONNECTED: &'static str = "consumer_disconnected";
    /// Wire name of [`MonitorEvent::MessageSent`].
    pub const MESSAGE_SENT: &'static str = "message_sent";

    /// Decode an event from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(&value)
    }

    /// Decode an event from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let fields = value.as_object().ok_or(DecodeError::NotAnObject)?;

        let Some(kind) = fields.get("event").and_then(Value::as_str) else {
            return Ok(Self::Unrecognized(None));
        };

        let event = match kind {
            Self::PRODUCER_CONNECTED => Self::ProducerConnected {
                id: required_id(fields, Self::PRODUCER_CONNECTED)?,
            },
            Self::PRODUCER_DISCONNECTED => Self::ProducerDisconnected {
                id: required_id(fields, Self::PRODUCER_DISCONNECTED)?,
            },
            Self::CONSUMER_CONNECTED => Self::ConsumerConnected {
                id: required_id(fields, Self::CONSUMER_CONNECTED)?,
            },
            Self::CONSUMER_DISCONNECTED => Self::ConsumerDisconnected {
                id: required_id(fields, Self::CONSUMER_DISCONNECTED)?,
            },
            Self::MESSAGE_SENT => Self::MessageSent(MessageEvent {
                from: optional_str(fields, "from")?.unwrap_or_else(|| DEFAULT_FROM.to_owned()),
                to: optional_str(fields, "to")?.unwrap_or_else(|| DEFAULT_TO.to_owned()),
                timestamp: optional_number(fields, "timestamp")?.unwrap_or_else(default_timestamp),
            }),
            other => Self::Unrecognized(Some(other.to_owned())),
        };

        Ok(event)
    }

    /// The wire name of this event, or `"unrecognized"`.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProducerConnected { .. } => Self::PRODUCER_CONNECTED,
            Self::ProducerDisconnected { .. } => Self::PRODUCER_DISCONNECTED,
            Self::ConsumerConnected { .. } => Self::CONSUMER_CONNECTED,
            Self::ConsumerDisconnected { .. } => Self::CONSUMER_DISCONNECTED,
            Self::MessageSent(_) => Self::MESSAGE_SENT,
            Self::Unrecognized(_) => "unrecognized",
        }
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn required_id(fields: &Map<String, Value>, event: &'static str) -> Result<String, DecodeError> {
    optional_str(fields, "id")?.ok_or(DecodeError::MissingField { event, field: "id" })
}

/// Absent and `null` are both treated as "not supplied".
fn optional_str(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, DecodeError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

fn optional_number(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Number>, DecodeError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(DecodeError::InvalidField {
            field,
            expected: "number",
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_endpoint_events() {
        let cases = [
            (
                json!({"event": "producer_connected", "id": "p1"}),
                MonitorEvent::ProducerConnected { id: "p1".into() },
            ),
            (
                json!({"event": "producer_disconnected", "id": "p1"}),
                MonitorEvent::ProducerDisconnected { id: "p1".into() },
            ),
            (
                json!({"event": "consumer_connected", "id": "c1"}),
                MonitorEvent::ConsumerConnected { id: "c1".into() },
            ),
            (
                json!({"event": "consumer_disconnected", "id": "c1"}),
                MonitorEvent::ConsumerDisconnected { id: "c1".into() },
            ),
        ];

        for (body, expected) in cases {
            assert_eq!(MonitorEvent::from_value(&body).unwrap(), expected);
        }
    }

    #[test]
    fn message_sent_keeps_supplied_fields() {
        let event = MonitorEvent::from_value(
            &json!({"event": "message_sent", "from": "p1", "to": "c2", "timestamp": 1.5}),
        )
        .unwrap();

        let MonitorEvent::MessageSent(msg) = event else {
            panic!("expected message_sent, got {event:?}");
        };
        assert_eq!(msg.from, "p1");
        assert_eq!(msg.to, "c2");
        assert_eq!(msg.timestamp.as_f64(), Some(1.5));
    }

    #[test]
    fn message_sent_defaults_missing_and_null_fields() {
        for body in [
            json!({"event": "message_sent"}),
            json!({"event": "message_sent", "from": null, "to": null, "timestamp": null}),
        ] {
            let event = MonitorEvent::from_value(&body).unwrap();
            assert_eq!(event, MonitorEvent::MessageSent(MessageEvent::default()));
        }
    }

    #[test]
    fn unknown_or_missing_kind_is_unrecognized() {
        assert_eq!(
            MonitorEvent::from_value(&json!({"event": "noop"})).unwrap(),
            MonitorEvent::Unrecognized(Some("noop".into()))
        );
        assert_eq!(
            MonitorEvent::from_value(&json!({"id": "p1"})).unwrap(),
            MonitorEvent::Unrecognized(None)
        );
        assert_eq!(
            MonitorEvent::from_value(&json!({"event": 7})).unwrap(),
            MonitorEvent::Unrecognized(None)
        );
    }

    #[test]
    fn endpoint_event_without_id_is_rejected() {
        let err = MonitorEvent::from_value(&json!({"event": "consumer_connected"})).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField {
                event: "consumer_connected",
                field: "id"
            }
        ));
    }

    #[test]
    fn wrongly_typed_fields_are_rejected() {
        let err =
            MonitorEvent::from_value(&json!({"event": "producer_connected", "id": 5})).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { field: "id", .. }));

        let err = MonitorEvent::from_value(&json!({"event": "message_sent", "timestamp": "now"}))
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidField {
                field: "timestamp",
                expected: "number"
            }
        ));
    }

    #[test]
    fn non_object_and_malformed_bodies_are_rejected() {
        assert!(matches!(
            MonitorEvent::from_slice(b"[1, 2]"),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            MonitorEvent::from_slice(b"{\"event\": "),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn integer_timestamp_beyond_u64_is_kept_verbatim() {
        let body = br#"{"event":"message_sent","from":"p1","to":"c1","timestamp":18446744073709551616}"#;
        let event = MonitorEvent::from_slice(body).unwrap();

        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"message_sent","from":"p1","to":"c1","timestamp":18446744073709551616}"#
        );
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let event = MonitorEvent::MessageSent(MessageEvent::new("p1", "broker", 123_u64));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "message_sent", "from": "p1", "to": "broker", "timestamp": 123})
        );

        let event = MonitorEvent::ProducerConnected { id: "p1".into() };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "producer_connected", "id": "p1"})
        );
    }
}
