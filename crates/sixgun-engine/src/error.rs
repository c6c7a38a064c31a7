//! Error types for the game engine.

use crate::GatewayError;

/// Coarse classification of a [`GameError`], used by front-ends to pick a
/// status code and by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    InsufficientResources,
    Internal,
}

/// Errors returned by game operations.
///
/// Every variant except [`Internal`](GameError::Internal) is raised before
/// any state is touched, so a rejected operation leaves the game exactly as
/// it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The request is malformed or the game is in the wrong state for it.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A game, player, or card does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The request collides with existing state (e.g. already seated).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller is not allowed to do this right now.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The deck, role pool, or character pool cannot cover the request.
    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    /// A card name with no registered effect.
    #[error("unknown card effect: {0}")]
    UnknownEffect(String),

    /// A collaborator (persistence) failed mid-operation. Nothing was
    /// committed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::UnknownEffect(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InsufficientResources(_) => ErrorKind::InsufficientResources,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for this error.
    pub fn code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InsufficientResources => 422,
            ErrorKind::Internal => 500,
        }
    }
}

impl From<GatewayError> for GameError {
    fn from(e: GatewayError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_effect_is_validation_kind() {
        let err = GameError::UnknownEffect("Whiskey".into());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(GameError::NotFound("game G-1".into()).code(), 404);
        assert_eq!(GameError::Conflict("seated".into()).code(), 409);
        assert_eq!(GameError::Forbidden("not your turn".into()).code(), 403);
        assert_eq!(GameError::InsufficientResources("deck".into()).code(), 422);
        assert_eq!(GameError::Internal("db".into()).code(), 500);
    }

    #[test]
    fn test_gateway_error_maps_to_internal() {
        let err: GameError = GatewayError::Unavailable("disk full".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("disk full"));
    }
}
