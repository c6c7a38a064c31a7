//! Codec trait and the JSON implementation.
//!
//! The server never hard-codes a wire format: the connection handler holds
//! something implementing [`Codec`] and uses it for requests, replies and
//! pushed events alike.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec is shared by every connection
/// task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes into an owned value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Browser clients read these frames
/// directly, so this is the default.
///
/// ```rust
/// use sixgun_protocol::{Codec, EventEnvelope, GameEvent, GameId, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let env = EventEnvelope::new(
///     GameId(1),
///     GameEvent::TurnStarted { player_id: PlayerId(3), drawn: 2 },
/// );
/// let bytes = codec.encode(&env).unwrap();
/// let decoded: EventEnvelope = codec.decode(&bytes).unwrap();
/// assert_eq!(env, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientRequest, GameId};

    #[test]
    fn test_json_codec_decodes_request() {
        let codec = JsonCodec;
        let req: ClientRequest = codec
            .decode(br#"{"action": "join_game", "game_id": 5}"#)
            .unwrap();
        assert_eq!(req, ClientRequest::JoinGame { game_id: GameId(5) });
    }

    #[test]
    fn test_json_codec_garbage_returns_decode_error() {
        let codec = JsonCodec;
        let result: Result<ClientRequest, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
