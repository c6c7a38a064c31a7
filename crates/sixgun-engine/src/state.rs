//! The complete state of one game session.

use serde::{Deserialize, Serialize};
use sixgun_protocol::{
    Card, CardId, GameId, GameStatus, GameSummary, GameView, PlayerId, PublicSeat, SeatView,
    TurnPhase,
};

use crate::Deck;
use crate::catalogue::SHERIFF;

/// One player's place at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub role: Option<String>,
    pub character: Option<String>,
    pub health: u32,
    pub hand: Vec<Card>,
    /// Status cards attached in front of the player.
    pub board: Vec<Card>,
}

impl Seat {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            role: None,
            character: None,
            health: 0,
            hand: Vec::new(),
            board: Vec::new(),
        }
    }

    pub fn is_sheriff(&self) -> bool {
        self.role.as_deref() == Some(SHERIFF)
    }

    pub fn hand_position(&self, card_id: CardId) -> Option<usize> {
        self.hand.iter().position(|c| c.id == card_id)
    }
}

/// A game session. Seats are kept in seating order and turn order is
/// purely positional: the seat after the last one is seat 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub name: String,
    pub creator: PlayerId,
    pub status: GameStatus,
    pub seats: Vec<Seat>,
    /// Seat index of the turn holder while active.
    pub current: Option<usize>,
    pub phase: Option<TurnPhase>,
    pub deck: Deck,
}

impl GameState {
    /// A waiting game with its creator in seat 0.
    pub fn new(id: GameId, name: impl Into<String>, creator: PlayerId) -> Self {
        Self {
            id,
            name: name.into(),
            creator,
            status: GameStatus::Waiting,
            seats: vec![Seat::new(creator)],
            current: None,
            phase: None,
            deck: Deck::default(),
        }
    }

    pub fn seat_index(&self, player_id: PlayerId) -> Option<usize> {
        self.seats.iter().position(|s| s.player_id == player_id)
    }

    pub fn seat(&self, player_id: PlayerId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == player_id)
    }

    pub fn seating(&self) -> Vec<PlayerId> {
        self.seats.iter().map(|s| s.player_id).collect()
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.current
            .and_then(|i| self.seats.get(i))
            .map(|s| s.player_id)
    }

    /// Cards in every pile, hand, and board. Constant once the deck is
    /// built.
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.deck.discard_len()
            + self
                .seats
                .iter()
                .map(|s| s.hand.len() + s.board.len())
                .sum::<usize>()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.id,
            name: self.name.clone(),
            creator_id: self.creator,
            status: self.status,
            player_count: self.seats.len(),
        }
    }

    /// What the whole table may see about each seat.
    pub fn public_seats(&self) -> Vec<PublicSeat> {
        self.seats
            .iter()
            .map(|s| PublicSeat {
                player_id: s.player_id,
                character: s.character.clone().unwrap_or_default(),
                health: s.health,
                sheriff: s.is_sheriff(),
            })
            .collect()
    }

    /// The game as `viewer` is allowed to see it: their own hand and role,
    /// the Sheriff's role, and only hand sizes for everybody else.
    pub fn view(&self, viewer: PlayerId) -> GameView {
        let seats = self
            .seats
            .iter()
            .map(|s| {
                let role = if s.player_id == viewer || s.is_sheriff() {
                    s.role.clone()
                } else {
                    None
                };
                SeatView {
                    player_id: s.player_id,
                    character: s.character.clone(),
                    health: s.health,
                    role,
                    hand_size: s.hand.len(),
                    board: s.board.clone(),
                }
            })
            .collect();

        GameView {
            summary: self.summary(),
            seats,
            current_turn: self.current_player(),
            phase: self.phase,
            deck_size: self.deck.len(),
            discard_size: self.deck.discard_len(),
            hand: self
                .seat(viewer)
                .map(|s| s.hand.clone())
                .unwrap_or_default(),
        }
    }
}
