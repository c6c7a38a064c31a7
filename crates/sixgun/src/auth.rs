//! Authentication hook for the handshake.
//!
//! Sixgun does not issue or check credentials itself. The embedding
//! application implements [`Authenticator`] on top of its own identity
//! provider and the server calls it once per connection, before any game
//! request is accepted.

use sixgun_protocol::PlayerId;

/// Raised when a handshake token is not accepted.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token was missing, malformed, expired, or unknown.
    #[error("authentication failed: {0}")]
    Rejected(String),

    /// The identity provider could not be asked.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Turns a client token into the authenticated player's id.
///
/// ```rust
/// use sixgun::{AuthError, Authenticator};
/// use sixgun_protocol::PlayerId;
///
/// /// Treats the token as the numeric user id. Development only.
/// struct NumericToken;
///
/// impl Authenticator for NumericToken {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, AuthError> {
///         let id: u64 = token
///             .parse()
///             .map_err(|_| AuthError::Rejected("token must be a number".into()))?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// An empty string is passed when the client sent no token.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, AuthError>> + Send;
}
