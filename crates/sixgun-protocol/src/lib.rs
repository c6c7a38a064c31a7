//! Wire protocol for Sixgun.
//!
//! - **Types** ([`GameEvent`], [`EventEnvelope`], ids, views): what the
//!   server pushes to the players of a room.
//! - **Messages** ([`ClientRequest`], [`ServerReply`]): the request/reply
//!   conversation on a client connection.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes in, typed values out.
//!
//! ```text
//! Transport (bytes) → Protocol (requests, events) → Engine (game sessions)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientRequest, ServerReply};
pub use types::{
    Card, CardId, CardKind, EffectOutcome, EventEnvelope, GameEvent, GameId, GameStatus,
    GameSummary, GameView, PlayerId, PublicSeat, SeatView, TurnPhase,
};
