//! # Sixgun
//!
//! A server-authoritative engine for a multiplayer social-deduction card
//! game in the style of *Bang!*: 4 to 7 players, secret roles, turn-by-turn
//! card play, and room-scoped event push over WebSockets.
//!
//! This crate is the front door. It authenticates connections, turns client
//! requests into calls on the [`GameRegistry`](sixgun_engine::GameRegistry),
//! and forwards each subscribed room's events to the socket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sixgun::prelude::*;
//!
//! struct DevAuth;
//!
//! impl Authenticator for DevAuth {
//!     async fn authenticate(&self, token: &str) -> Result<PlayerId, AuthError> {
//!         token
//!             .parse()
//!             .map(PlayerId)
//!             .map_err(|_| AuthError::Rejected("token must be a number".into()))
//!     }
//! }
//!
//! # async fn run() -> Result<(), SixgunError> {
//! let server = SixgunServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(InMemoryGateway::default(), DevAuth)
//!     .await?;
//! server.run().await
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod handler;
mod server;

pub use auth::{AuthError, Authenticator};
pub use error::SixgunError;
pub use server::{PROTOCOL_VERSION, SixgunServer, SixgunServerBuilder};

/// Everything needed to embed a server, in one import.
pub mod prelude {
    pub use crate::{
        AuthError, Authenticator, PROTOCOL_VERSION, SixgunError, SixgunServer,
        SixgunServerBuilder,
    };
    pub use sixgun_broadcast::BroadcastConfig;
    pub use sixgun_engine::{
        Catalogue, EngineConfig, GameError, GameRegistry, GameState, InMemoryGateway,
        PersistenceGateway,
    };
    pub use sixgun_protocol::{
        CardId, ClientRequest, EventEnvelope, GameEvent, GameId, GameStatus, PlayerId,
        ServerReply, TurnPhase,
    };
}
