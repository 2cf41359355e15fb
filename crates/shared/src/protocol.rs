//! Envelope codec helpers and closure conventions.
//!
//! Both ends of the queue socket speak JSON text frames; these helpers keep
//! the client, the server, and the tests on one codec path.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;
use crate::models::{SocketRequest, SocketResponse};

/// WebSocket close code signalling an intentional, clean shutdown.
/// Any other code (or a dropped stream) counts as an unclean closure.
pub const NORMAL_CLOSURE: u16 = 1000;

pub fn encode_request<T: Serialize>(request: &SocketRequest<T>) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(ProtocolError::Encode)
}

pub fn decode_request<T: DeserializeOwned>(text: &str) -> Result<SocketRequest<T>, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

pub fn encode_response<T: Serialize>(
    response: &SocketResponse<T>,
) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(ProtocolError::Encode)
}

pub fn decode_response<T: DeserializeOwned>(text: &str) -> Result<SocketResponse<T>, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueueResponse;

    #[test]
    fn decode_rejects_non_envelope_frames() {
        let err = decode_response::<QueueResponse>("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn decode_rejects_unknown_message_types() {
        let raw = r#"{"userId":null,"body":{"type":"somethingElse"}}"#;
        assert!(decode_response::<QueueResponse>(raw).is_err());
    }
}
