//! Card effect resolution.
//!
//! Effects run after the played card has left the player's hand and landed
//! on the discard pile. Status cards then move from the discard pile onto a
//! board; everything else stays discarded.

use rand::Rng;
use sixgun_protocol::{CardId, EffectOutcome, PlayerId};

use crate::catalogue::{BANG, BARREL, BEER, DYNAMITE, JAIL, MISSED};
use crate::{EngineConfig, GameError, GameState};

/// The six effects the engine knows, keyed by card name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Bang,
    Missed,
    Beer,
    Jail,
    Dynamite,
    Barrel,
}

impl Effect {
    pub fn from_name(name: &str) -> Result<Self, GameError> {
        match name {
            BANG => Ok(Self::Bang),
            MISSED => Ok(Self::Missed),
            BEER => Ok(Self::Beer),
            JAIL => Ok(Self::Jail),
            DYNAMITE => Ok(Self::Dynamite),
            BARREL => Ok(Self::Barrel),
            other => Err(GameError::UnknownEffect(other.to_string())),
        }
    }

    /// Whether the card must be aimed at another seated player.
    pub fn needs_target(self) -> bool {
        matches!(self, Self::Bang | Self::Jail)
    }
}

/// Rolls `0..100` and reports whether it landed below `threshold`.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, threshold: u32) -> bool {
    rng.random_range(0..100) < threshold
}

/// Checks the target of a play and returns its seat index.
///
/// Untargeted cards ignore whatever target was sent.
pub fn check_target(
    state: &GameState,
    effect: Effect,
    player: PlayerId,
    target: Option<PlayerId>,
) -> Result<Option<usize>, GameError> {
    if !effect.needs_target() {
        return Ok(None);
    }
    let target = target.ok_or_else(|| GameError::Validation("this card needs a target".into()))?;
    if target == player {
        return Err(GameError::Validation("cannot target yourself".into()));
    }
    state
        .seat_index(target)
        .map(Some)
        .ok_or_else(|| GameError::NotFound(format!("player {target} in game {}", state.id)))
}

/// A card that has just been played.
#[derive(Debug, Clone, Copy)]
pub struct Play {
    pub seat: usize,
    pub card_id: CardId,
    pub target: Option<usize>,
}

/// Applies `effect` to `state` and returns the outcome to announce, if any.
pub fn resolve<R: Rng + ?Sized>(
    effect: Effect,
    play: Play,
    state: &mut GameState,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Option<EffectOutcome>, GameError> {
    let player_id = seat_player(state, play.seat)?;

    match effect {
        Effect::Bang => {
            let target = required(play.target)?;
            let target_id = seat_player(state, target)?;
            let seat = &mut state.seats[target];

            if let Some(pos) = seat.hand.iter().position(|c| c.name == MISSED) {
                let missed = seat.hand.remove(pos);
                state.deck.discard(missed);
                return Ok(Some(EffectOutcome::Missed {
                    player_id,
                    target_id,
                    successful: true,
                }));
            }

            seat.health = seat.health.saturating_sub(config.bang_damage);
            Ok(Some(EffectOutcome::Bang {
                player_id,
                target_id,
                damage: config.bang_damage,
            }))
        }

        Effect::Missed => Ok(None),

        Effect::Beer => {
            let seat = &mut state.seats[play.seat];
            let healed = seat.health.saturating_add(config.beer_heal);
            let healed = config.beer_health_cap.map_or(healed, |cap| healed.min(cap).max(seat.health));
            let heal = healed - seat.health;
            seat.health = healed;
            Ok(Some(EffectOutcome::Beer { player_id, heal }))
        }

        Effect::Jail => {
            let target = required(play.target)?;
            let target_id = seat_player(state, target)?;
            let card = take_played(state, play.card_id)?;
            state.seats[target].board.push(card);
            Ok(Some(EffectOutcome::Jail { target_id }))
        }

        Effect::Dynamite => {
            if roll(rng, config.dynamite_threshold) {
                let seat = &mut state.seats[play.seat];
                seat.health = seat.health.saturating_sub(config.dynamite_damage);
                return Ok(Some(EffectOutcome::Dynamite {
                    player_id,
                    exploded: true,
                    damage: config.dynamite_damage,
                    next_player: None,
                }));
            }

            let next = (play.seat + 1) % state.seats.len();
            let next_id = seat_player(state, next)?;
            let card = take_played(state, play.card_id)?;
            state.seats[next].board.push(card);
            Ok(Some(EffectOutcome::Dynamite {
                player_id,
                exploded: false,
                damage: 0,
                next_player: Some(next_id),
            }))
        }

        Effect::Barrel => Ok(Some(EffectOutcome::Barrel {
            player_id,
            successful: roll(rng, config.barrel_threshold),
        })),
    }
}

fn seat_player(state: &GameState, seat: usize) -> Result<PlayerId, GameError> {
    state
        .seats
        .get(seat)
        .map(|s| s.player_id)
        .ok_or_else(|| GameError::NotFound(format!("seat {seat} in game {}", state.id)))
}

fn required(target: Option<usize>) -> Result<usize, GameError> {
    target.ok_or_else(|| GameError::Validation("this card needs a target".into()))
}

fn take_played(state: &mut GameState, card_id: CardId) -> Result<sixgun_protocol::Card, GameError> {
    state
        .deck
        .take_discarded(card_id)
        .ok_or_else(|| GameError::Internal(format!("played card {card_id} missing from discard pile")))
}
