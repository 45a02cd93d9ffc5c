use crate::actions::ActionRequest;
use crate::frames::SharedGestureState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type FrameId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FrameMessage {
    /// Child → root, relayed hop by hop through the parent chain.
    Register { frame: FrameId },
    /// Full state snapshot. `origin` is the frame that made the change.
    SyncState {
        origin: FrameId,
        state: SharedGestureState,
    },
    /// Root → all, current gesture string for display.
    ShowProgress { arrows: String },
    /// Root → all, the stroke is over.
    Reset,
    /// Child → parent, an action this frame cannot run itself.
    ExecuteAction {
        from: FrameId,
        request: ActionRequest,
    },
    /// Any → all, turns gestures off for the rest of the page's life.
    Disable { origin: FrameId },
}

/// Wire format: `{ "extensionId": ..., "type": ..., ...payload }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub extension_id: String,
    #[serde(flatten)]
    pub message: FrameMessage,
}

impl Envelope {
    pub fn encode(extension_id: &str, message: FrameMessage) -> serde_json::Result<Value> {
        serde_json::to_value(Envelope {
            extension_id: extension_id.to_string(),
            message,
        })
    }

    /// Decode `payload`, rejecting anything not stamped with `extension_id`.
    pub fn decode(payload: &Value, extension_id: &str) -> Option<FrameMessage> {
        let stamped = payload.get("extensionId").and_then(Value::as_str);
        if stamped != Some(extension_id) {
            tracing::debug!("ignoring message from another sender");
            return None;
        }
        match serde_json::from_value::<Envelope>(payload.clone()) {
            Ok(envelope) => Some(envelope.message),
            Err(err) => {
                tracing::debug!(?err, "ignoring malformed frame message");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_is_flat() {
        let payload = Envelope::encode("ext", FrameMessage::Register { frame: 3 }).unwrap();
        assert_eq!(
            payload,
            json!({ "extensionId": "ext", "type": "register", "frame": 3 })
        );
    }

    #[test]
    fn foreign_and_unstamped_messages_are_dropped() {
        let unstamped = json!({ "type": "reset" });
        let foreign = json!({ "extensionId": "other", "type": "reset" });
        let ours = json!({ "extensionId": "ext", "type": "reset" });
        assert_eq!(Envelope::decode(&unstamped, "ext"), None);
        assert_eq!(Envelope::decode(&foreign, "ext"), None);
        assert_eq!(Envelope::decode(&ours, "ext"), Some(FrameMessage::Reset));
    }

    #[test]
    fn malformed_payload_is_dropped() {
        let payload = json!({ "extensionId": "ext", "type": "sync-state", "origin": "x" });
        assert_eq!(Envelope::decode(&payload, "ext"), None);
    }
}
