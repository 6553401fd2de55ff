//! State records for the monitor's aggregate view.
//!
//! The serialized form of [`SystemState`] is the body of `GET /status`:
//!
//! ```json
//! {
//!   "producers": { "p1": { "connected": true, "message_count": 0 } },
//!   "consumers": {},
//!   "broker": { "active": true, "total_messages": 3 },
//!   "messages": [ { "from": "p1", "to": "broker", "timestamp": 123 } ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use ts_rs::TS;

/// Sender recorded for a `message_sent` report that omits `from`.
pub const DEFAULT_FROM: &str = "producer";

/// Receiver recorded for a `message_sent` report that omits `to`.
pub const DEFAULT_TO: &str = "broker";

/// Timestamp recorded for a `message_sent` report that omits `timestamp`.
pub fn default_timestamp() -> Number {
    Number::from(0_u8)
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Connection record for a single producer or consumer.
///
/// The endpoint id is not stored here; it is the key of the owning map in
/// [`SystemState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Endpoint {
    /// Whether the endpoint is currently connected to the broker.
    pub connected: bool,
    /// Messages attributed to this endpoint since it last connected.
    #[ts(type = "number")]
    pub message_count: u64,
}

impl Endpoint {
    /// A freshly connected endpoint with a zeroed message count.
    pub const fn connected() -> Self {
        Self {
            connected: true,
            message_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// BrokerStatus
// ---------------------------------------------------------------------------

/// Singleton broker record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BrokerStatus {
    /// Whether the broker is considered up. Set once at startup.
    pub active: bool,
    /// Every `message_sent` report ever received, including those evicted
    /// from the recent-message window.
    #[ts(type = "number")]
    pub total_messages: u64,
}

impl Default for BrokerStatus {
    fn default() -> Self {
        Self {
            active: true,
            total_messages: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// MessageEvent
// ---------------------------------------------------------------------------

/// One observed transmission, used by the dashboard for animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageEvent {
    /// Sending endpoint.
    pub from: String,
    /// Receiving endpoint.
    pub to: String,
    /// Sender-supplied timestamp, kept exactly as reported.
    #[ts(as = "f64")]
    pub timestamp: Number,
}

impl MessageEvent {
    /// Build a message record from explicit values.
    pub fn new(from: impl Into<String>, to: impl Into<String>, timestamp: impl Into<Number>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            timestamp: timestamp.into(),
        }
    }
}

impl Default for MessageEvent {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM.to_owned(),
            to: DEFAULT_TO.to_owned(),
            timestamp: default_timestamp(),
        }
    }
}

// ---------------------------------------------------------------------------
// SystemState
// ---------------------------------------------------------------------------

/// Full aggregate view of the demo system.
///
/// Maps are keyed by endpoint id. Producers and consumers live in separate
/// namespaces, so the same id may appear in both. `messages` is ordered
/// oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemState {
    /// Producer records keyed by producer id.
    pub producers: BTreeMap<String, Endpoint>,
    /// Consumer records keyed by consumer id.
    pub consumers: BTreeMap<String, Endpoint>,
    /// Broker totals.
    pub broker: BrokerStatus,
    /// Recent message window, oldest first.
    pub messages: Vec<MessageEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_serializes_to_dashboard_shape() {
        let json = serde_json::to_value(SystemState::default()).unwrap_or_default();
        assert_eq!(
            json,
            serde_json::json!({
                "producers": {},
                "consumers": {},
                "broker": { "active": true, "total_messages": 0 },
                "messages": [],
            })
        );
    }

    #[test]
    fn endpoint_id_is_the_map_key() {
        let mut state = SystemState::default();
        state.producers.insert("p1".to_owned(), Endpoint::connected());

        let json = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(
            json["producers"]["p1"],
            serde_json::json!({ "connected": true, "message_count": 0 })
        );
    }

    #[test]
    fn integer_timestamp_stays_integer() {
        let msg = MessageEvent::new("p1", "broker", 123_u64);
        let json = serde_json::to_string(&msg).unwrap_or_default();
        assert_eq!(json, r#"{"from":"p1","to":"broker","timestamp":123}"#);
    }

    #[test]
    fn default_message_uses_documented_constants() {
        let msg = MessageEvent::default();
        assert_eq!(msg.from, DEFAULT_FROM);
        assert_eq!(msg.to, DEFAULT_TO);
        assert_eq!(msg.timestamp, default_timestamp());
    }
}
