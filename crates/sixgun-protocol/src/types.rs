//! Core wire types for Sixgun.
//!
//! Everything in this module travels between the server and its clients:
//! identifiers, the public shape of cards and seats, and the closed set of
//! game events that the room broadcaster pushes to subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game (also the room id events are scoped to).
///
/// Serialized as a plain number thanks to `#[serde(transparent)]`, so the
/// envelope reads `"game_id": 7` rather than `"game_id": {"0": 7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// The authenticated identity of a user. Supplied by the embedding
/// application; the engine never derives turn order from its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies one physical card instance inside a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle of a game.
///
/// ```text
/// Waiting → Assigning → Active → Finished
/// ```
///
/// `Assigning` is only observable inside the start operation; once roles and
/// characters are dealt the game moves straight on to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Assigning,
    Active,
    Finished,
}

impl GameStatus {
    /// Returns `true` while players may still take a seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while turns are being played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The only legal successor of this status, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Assigning),
            Self::Assigning => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving to `target` follows the lifecycle order.
    /// Deletion may finish a game from any status.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target) || (target == Self::Finished && self != Self::Finished)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Assigning => write!(f, "assigning"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Sub-state of the active turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// The turn holder has not drawn yet.
    Draw,
    /// Cards may be played.
    Play,
    /// The turn holder started discarding; no further plays this turn.
    Discard,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw => write!(f, "draw"),
            Self::Play => write!(f, "play"),
            Self::Discard => write!(f, "discard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Effect tag of a card definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Resolves once and goes to the discard pile.
    Action,
    /// Ends up attached to a player's board.
    Status,
}

/// A single card instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
}

// ---------------------------------------------------------------------------
// Seats and views
// ---------------------------------------------------------------------------

/// What every participant may know about a seat once the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSeat {
    pub player_id: PlayerId,
    pub character: String,
    pub health: u32,
    /// The Sheriff is the only role revealed to the table.
    pub sheriff: bool,
}

/// A row in the game list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub name: String,
    pub creator_id: PlayerId,
    pub status: GameStatus,
    pub player_count: usize,
}

/// One seat as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub character: Option<String>,
    pub health: u32,
    /// Only present for the viewer's own seat and for the Sheriff.
    pub role: Option<String>,
    pub hand_size: usize,
    pub board: Vec<Card>,
}

/// Game details as seen by one player. Other players' hands and secret
/// roles are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub summary: GameSummary,
    pub seats: Vec<SeatView>,
    pub current_turn: Option<PlayerId>,
    pub phase: Option<TurnPhase>,
    pub deck_size: usize,
    pub discard_size: usize,
    /// The viewer's own hand (empty for spectators).
    pub hand: Vec<Card>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The resolved outcome of a played card, carried by `card_effect`.
///
/// Internally tagged on `"effect"` with the card's display name, so a Beer
/// serializes as `{"effect": "Beer", "player_id": 3, "heal": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect")]
pub enum EffectOutcome {
    #[serde(rename = "Bang!")]
    Bang {
        player_id: PlayerId,
        target_id: PlayerId,
        damage: u32,
    },
    /// A Bang! was neutralized by a Missed! from the target's hand.
    #[serde(rename = "Missed!")]
    Missed {
        player_id: PlayerId,
        target_id: PlayerId,
        successful: bool,
    },
    Beer { player_id: PlayerId, heal: u32 },
    Jail { target_id: PlayerId },
    Dynamite {
        player_id: PlayerId,
        exploded: bool,
        damage: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_player: Option<PlayerId>,
    },
    Barrel { player_id: PlayerId, successful: bool },
}

/// Every observable state change a room can emit.
///
/// Adjacently tagged: the variant name lands in `"event"` and the payload in
/// `"data"`, which is exactly the envelope shape clients consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined { player_id: PlayerId, seat: usize },
    GameStarted {
        seating: Vec<PlayerId>,
        seats: Vec<PublicSeat>,
        first_player_id: PlayerId,
    },
    TurnStarted { player_id: PlayerId, drawn: usize },
    TurnEnded {
        previous_player_id: PlayerId,
        next_player_id: PlayerId,
    },
    CardPlayed {
        player_id: PlayerId,
        card_id: CardId,
        card_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<PlayerId>,
    },
    CardEffect(EffectOutcome),
    CardDiscarded { player_id: PlayerId, card_id: CardId },
    DeckReshuffled { deck_size: usize },
    GameDeleted { game_id: GameId },
}

impl GameEvent {
    /// The wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "player_joined",
            Self::GameStarted { .. } => "game_started",
            Self::TurnStarted { .. } => "turn_started",
            Self::TurnEnded { .. } => "turn_ended",
            Self::CardPlayed { .. } => "card_played",
            Self::CardEffect(_) => "card_effect",
            Self::CardDiscarded { .. } => "card_discarded",
            Self::DeckReshuffled { .. } => "deck_reshuffled",
            Self::GameDeleted { .. } => "game_deleted",
        }
    }
}

/// A room-scoped event as it travels on the wire:
/// `{ "game_id": 1, "event": "turn_started", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub game_id: GameId,
    #[serde(flatten)]
    pub event: GameEvent,
}

impl EventEnvelope {
    pub fn new(game_id: GameId, event: GameEvent) -> Self {
        Self { game_id, event }
    }
}
