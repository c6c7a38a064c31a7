//! Request/reply messages exchanged on a client connection.
//!
//! Requests are tagged on `"action"`, replies on `"reply"`. Room events are
//! pushed on the same socket as bare [`EventEnvelope`](crate::EventEnvelope)s,
//! so a client tells them apart by the presence of the `"event"` key.

use serde::{Deserialize, Serialize};

use crate::{CardId, GameId, GameSummary, GameView, PlayerId};

/// Client → Server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Must be the first message on a connection.
    Handshake {
        version: u32,
        token: Option<String>,
    },
    CreateGame { name: String },
    ListGames,
    GameDetails { game_id: GameId },
    JoinGame { game_id: GameId },
    StartGame { game_id: GameId },
    StartTurn { game_id: GameId },
    PlayCard {
        game_id: GameId,
        card_id: CardId,
        #[serde(default)]
        target_id: Option<PlayerId>,
    },
    DiscardCard { game_id: GameId, card_id: CardId },
    EndTurn { game_id: GameId },
    DeleteGame { game_id: GameId },
    /// Start receiving the room's events on this connection.
    Subscribe { game_id: GameId },
    Unsubscribe { game_id: GameId },
}

/// Server → Client, in answer to one [`ClientRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum ServerReply {
    Welcome { player_id: PlayerId, server_time: u64 },
    Ok,
    GameCreated { game_id: GameId },
    Games { games: Vec<GameSummary> },
    Details { view: GameView },
    Subscribed { game_id: GameId },
    /// `code` follows HTTP conventions (400, 403, 404, 409, 422, 500).
    Error { code: u16, message: String },
}
