//! The Sixgun game session engine.
//!
//! Each game runs as an isolated Tokio task (actor model) that owns its
//! state: seating, deck, hands, boards, and health. The [`GameRegistry`]
//! creates and looks up those actors; every change they commit is
//! persisted through a [`PersistenceGateway`] and then announced on the
//! game's room via the [`RoomBroadcaster`](sixgun_broadcast::RoomBroadcaster).
//!
//! # Key types
//!
//! - [`GameRegistry`]: create / get / delete / list games
//! - [`GameHandle`]: send commands to a running game actor
//! - [`GameState`]: the full session state, as persisted
//! - [`EngineConfig`]: rule tunables and RNG seeding
//! - [`Catalogue`]: card, role, and character definitions
//! - [`PersistenceGateway`] / [`InMemoryGateway`]: storage boundary
//!
//! The pure pieces ([`machine`], [`deck`], [`assign`], [`effects`]) work on
//! a `GameState` directly and can be driven without a runtime.

pub mod assign;
mod catalogue;
mod config;
pub mod deck;
pub mod effects;
mod error;
mod game;
mod gateway;
pub mod machine;
mod registry;
mod state;

pub use catalogue::{
    BANG, BARREL, BEER, CardDef, Catalogue, CharacterDef, DYNAMITE, JAIL, MISSED, RoleDef, SHERIFF,
};
pub use config::EngineConfig;
pub use deck::Deck;
pub use error::{ErrorKind, GameError};
pub use game::GameHandle;
pub use gateway::{GatewayError, InMemoryGateway, PersistenceGateway, PlayerRecord};
pub use registry::GameRegistry;
pub use state::{GameState, Seat};
