//! Envelope and matchmaking-queue message types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier issued by the server on the first response and echoed by the
/// client on every subsequent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// --- WebSocket envelopes ---

/// Client-to-server envelope: `{"userId": string|null, "body": ...}`.
///
/// `user_id` stays null until the server has issued one. It is serialized
/// explicitly rather than skipped, so the server can tell "no session yet"
/// apart from a malformed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketRequest<T> {
    pub user_id: Option<UserId>,
    pub body: T,
}

/// Server-to-client envelope, same shape as [`SocketRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketResponse<T> {
    pub user_id: Option<UserId>,
    pub body: T,
}

// --- Queue protocol ---

/// Requests a client may issue against the matchmaking queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum QueueRequest {
    JoinQueue,
    LeaveQueue,
}

/// Server events delivered to a queued client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum QueueResponse {
    QueueJoined,
    MatchFound { server: String },
    QueueError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_wire_shape() {
        let envelope = SocketRequest {
            user_id: None,
            body: QueueRequest::JoinQueue,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"userId":null,"body":{"type":"joinQueue"}}"#);
    }

    #[test]
    fn request_envelope_carries_session_id() {
        let user_id = UserId(Uuid::parse_str("6c910ed3-94bb-4a2c-9a2e-3a00b3f5c1a4").unwrap());
        let envelope = SocketRequest {
            user_id: Some(user_id),
            body: QueueRequest::LeaveQueue,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            json,
            r#"{"userId":"6c910ed3-94bb-4a2c-9a2e-3a00b3f5c1a4","body":{"type":"leaveQueue"}}"#
        );
    }

    #[test]
    fn response_envelope_decodes_match_found() {
        let raw = r#"{
            "userId": "6c910ed3-94bb-4a2c-9a2e-3a00b3f5c1a4",
            "body": {"type": "matchFound", "data": {"server": "game-7"}}
        }"#;
        let envelope: SocketResponse<QueueResponse> = serde_json::from_str(raw).unwrap();
        assert!(envelope.user_id.is_some());
        assert_eq!(
            envelope.body,
            QueueResponse::MatchFound {
                server: "game-7".to_string()
            }
        );
    }
}
