//! Unified error type for the server crate.

use sixgun_broadcast::BroadcastError;
use sixgun_engine::GameError;
use sixgun_protocol::ProtocolError;
use sixgun_transport::TransportError;

use crate::AuthError;

/// Wraps the error of every layer so `?` works across them.
#[derive(Debug, thiserror::Error)]
pub enum SixgunError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// A game operation was rejected or failed.
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[cfg(test)]
mod tests {
    use sixgun_transport::ConnectionId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: SixgunError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, SixgunError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: SixgunError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, SixgunError::Protocol(_)));
    }

    #[test]
    fn test_from_broadcast_error() {
        let err: SixgunError = BroadcastError::Lagging(ConnectionId::new(3)).into();
        assert!(matches!(err, SixgunError::Broadcast(_)));
        assert!(err.to_string().contains("conn-3"));
    }

    #[test]
    fn test_from_game_error_keeps_message() {
        let err: SixgunError = GameError::Forbidden("not your turn".into()).into();
        assert!(matches!(err, SixgunError::Game(GameError::Forbidden(_))));
        assert_eq!(err.to_string(), "forbidden: not your turn");
    }

    #[test]
    fn test_from_auth_error() {
        let err: SixgunError = AuthError::Rejected("expired".into()).into();
        assert!(matches!(err, SixgunError::Auth(_)));
    }
}
