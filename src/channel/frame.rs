//! # Wire contract.
//!
//! The event endpoint speaks JSON text frames:
//!
//! - **Inbound** (server → client): [`Envelope`] - `{"topic": ..., "payload": ...}`.
//! - **Outbound** (client → server): [`ClientFrame`] - tagged with an `"op"`
//!   field so the server can tell data from subscription control:
//!   `{"op": "publish", "topic": ..., "payload": ...}`,
//!   `{"op": "subscribe", "topic": ...}`,
//!   `{"op": "unsubscribe", "topic": ...}`.
//!
//! Heartbeats use transport-native ping/pong frames and never appear in the
//! JSON layer. Malformed inbound frames are dropped per-message upstream;
//! decoding failures here surface as [`ChannelError::Malformed`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChannelError;

/// One data message: a topic tag plus an arbitrary JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Routing tag; non-empty by construction at the API boundary.
    pub topic: String,
    /// Arbitrary JSON payload.
    pub payload: Value,
}

impl Envelope {
    /// Parses an inbound text frame.
    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(text).map_err(|e| ChannelError::Malformed {
            reason: e.to_string(),
        })
    }
}

/// Client → server frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum ClientFrame {
    /// Ask the server to start routing `topic` to this connection.
    Subscribe { topic: String },
    /// Ask the server to stop routing `topic`.
    Unsubscribe { topic: String },
    /// Publish a data message.
    Publish { topic: String, payload: Value },
}

impl ClientFrame {
    /// Serializes the frame to its JSON text form.
    pub(crate) fn encode(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(|e| ChannelError::Malformed {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_decodes_minimum_shape() {
        let env = Envelope::decode(r#"{"topic":"cognitive_event","payload":{"n":1}}"#).unwrap();
        assert_eq!(env.topic, "cognitive_event");
        assert_eq!(env.payload, json!({"n": 1}));
    }

    #[test]
    fn test_envelope_rejects_malformed() {
        let err = Envelope::decode("{not json").unwrap_err();
        assert_eq!(err.as_label(), "channel_malformed_message");

        // Valid JSON, wrong shape.
        assert!(Envelope::decode(r#"{"payload": 1}"#).is_err());
    }

    #[test]
    fn test_client_frames_carry_op_tag() {
        let sub = ClientFrame::Subscribe {
            topic: "kb_update".into(),
        }
        .encode()
        .unwrap();
        assert!(sub.contains(r#""op":"subscribe""#));
        assert!(sub.contains(r#""topic":"kb_update""#));

        let publ = ClientFrame::Publish {
            topic: "query".into(),
            payload: json!({"q": "hello"}),
        }
        .encode()
        .unwrap();
        assert!(publ.contains(r#""op":"publish""#));
        assert!(publ.contains(r#""payload""#));
    }

    #[test]
    fn test_publish_frame_roundtrips() {
        let frame = ClientFrame::Publish {
            topic: "query".into(),
            payload: json!([1, 2, 3]),
        };
        let text = frame.encode().unwrap();
        let back: ClientFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(back, frame);
    }
}
