//! The turn/phase state machine.
//!
//! Every operation checks all of its guards before touching the state, so
//! an `Err` always means "nothing happened". On success it returns the
//! events to broadcast, in order.
//!
//! ```text
//! Waiting → Assigning → Draw → Play ⇄ Discard → (end turn) → Draw → … → Finished
//! ```

use rand::Rng;
use sixgun_protocol::{CardId, GameEvent, GameStatus, PlayerId, TurnPhase};

use crate::assign::assign;
use crate::effects::{self, Effect, Play};
use crate::{Catalogue, CharacterDef, Deck, EngineConfig, GameError, GameState, RoleDef, Seat};

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// Seats `player` at the end of the table.
pub fn join(
    state: &mut GameState,
    config: &EngineConfig,
    player: PlayerId,
) -> Result<Vec<GameEvent>, GameError> {
    if !state.status.is_joinable() {
        return Err(GameError::Validation(format!(
            "cannot join a game that is {}",
            state.status
        )));
    }
    if player == state.creator {
        return Err(GameError::Forbidden("the creator is already seated".into()));
    }
    if state.seat_index(player).is_some() {
        return Err(GameError::Conflict(format!(
            "player {player} already seated in game {}",
            state.id
        )));
    }
    if state.seats.len() >= config.max_players {
        return Err(GameError::Validation(format!(
            "game {} is full ({} players)",
            state.id, config.max_players
        )));
    }

    state.seats.push(Seat::new(player));
    Ok(vec![GameEvent::PlayerJoined {
        player_id: player,
        seat: state.seats.len() - 1,
    }])
}

/// Guards of [`start`], split out so callers can fail fast before
/// fetching roles and characters.
pub fn check_start(
    state: &GameState,
    config: &EngineConfig,
    caller: PlayerId,
) -> Result<(), GameError> {
    if state.status != GameStatus::Waiting {
        return Err(GameError::Validation(format!(
            "game {} is already {}",
            state.id, state.status
        )));
    }
    if caller != state.creator {
        return Err(GameError::Forbidden("only the creator can start the game".into()));
    }
    let n = state.seats.len();
    if n < config.min_players || n > config.max_players {
        return Err(GameError::Validation(format!(
            "need {}-{} players to start, have {n}",
            config.min_players, config.max_players
        )));
    }
    Ok(())
}

/// Fixes the seating, builds the deck, deals roles and characters, and
/// hands the first turn to seat 0.
pub fn start<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &EngineConfig,
    catalogue: &Catalogue,
    caller: PlayerId,
    roles: Vec<RoleDef>,
    characters: Vec<CharacterDef>,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    check_start(state, config, caller)?;

    let seating = state.seating();
    let dealt = assign(&seating, roles, characters, rng)?;

    state.status = GameStatus::Assigning;
    state.deck = Deck::build(&catalogue.cards);
    if config.shuffle_on_start {
        state.deck.shuffle(rng);
    }
    for (seat, a) in state.seats.iter_mut().zip(dealt) {
        seat.role = Some(a.role.name);
        seat.character = Some(a.character.name);
        seat.health = a.health;
    }

    state.status = GameStatus::Active;
    state.current = Some(0);
    state.phase = Some(TurnPhase::Draw);

    Ok(vec![GameEvent::GameStarted {
        seats: state.public_seats(),
        first_player_id: seating[0],
        seating,
    }])
}

// ---------------------------------------------------------------------------
// Turns
// ---------------------------------------------------------------------------

/// Draws the turn's cards and opens the play phase.
pub fn start_turn<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &EngineConfig,
    caller: PlayerId,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    let seat = turn_holder(state, caller)?;
    expect_phase(state, &[TurnPhase::Draw])?;

    let available = state.deck.len() + state.deck.discard_len();
    if available < config.cards_per_turn {
        return Err(GameError::InsufficientResources(format!(
            "{available} cards left, {} needed",
            config.cards_per_turn
        )));
    }

    let mut events = Vec::new();
    for _ in 0..config.cards_per_turn {
        if state.deck.is_empty() {
            let deck_size = state.deck.reshuffle(rng);
            events.push(GameEvent::DeckReshuffled { deck_size });
        }
        let card = state
            .deck
            .draw()
            .ok_or_else(|| GameError::Internal("deck empty after reshuffle".into()))?;
        state.seats[seat].hand.push(card);
    }

    state.phase = Some(TurnPhase::Play);
    events.push(GameEvent::TurnStarted {
        player_id: caller,
        drawn: config.cards_per_turn,
    });
    Ok(events)
}

/// Plays a card from the caller's hand and resolves it.
pub fn play_card<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &EngineConfig,
    caller: PlayerId,
    card_id: CardId,
    target: Option<PlayerId>,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    let seat = turn_holder(state, caller)?;
    expect_phase(state, &[TurnPhase::Play])?;
    let pos = hand_position(state, seat, card_id)?;
    let effect = Effect::from_name(&state.seats[seat].hand[pos].name)?;
    let target_seat = effects::check_target(state, effect, caller, target)?;

    let card = state.seats[seat].hand.remove(pos);
    let card_name = card.name.clone();
    state.deck.discard(card);

    let play = Play {
        seat,
        card_id,
        target: target_seat,
    };
    let outcome = effects::resolve(effect, play, state, config, rng)?;

    let mut events = vec![GameEvent::CardPlayed {
        player_id: caller,
        card_id,
        card_name,
        target_id: target,
    }];
    events.extend(outcome.map(GameEvent::CardEffect));
    Ok(events)
}

/// Throws a card away. Once the holder starts discarding, no more cards
/// can be played this turn.
pub fn discard(
    state: &mut GameState,
    caller: PlayerId,
    card_id: CardId,
) -> Result<Vec<GameEvent>, GameError> {
    let seat = turn_holder(state, caller)?;
    expect_phase(state, &[TurnPhase::Play, TurnPhase::Discard])?;
    let pos = hand_position(state, seat, card_id)?;

    let card = state.seats[seat].hand.remove(pos);
    state.deck.discard(card);
    state.phase = Some(TurnPhase::Discard);

    Ok(vec![GameEvent::CardDiscarded {
        player_id: caller,
        card_id,
    }])
}

/// Passes the turn to the next seat, wrapping from the last seat to the
/// first.
pub fn end_turn(state: &mut GameState, caller: PlayerId) -> Result<Vec<GameEvent>, GameError> {
    let seat = turn_holder(state, caller)?;
    let next = (seat + 1) % state.seats.len();
    let next_player_id = state.seats[next].player_id;

    state.current = Some(next);
    state.phase = Some(TurnPhase::Draw);

    Ok(vec![GameEvent::TurnEnded {
        previous_player_id: caller,
        next_player_id,
    }])
}

/// Ends the game for good. Only the creator may do this.
pub fn finish(state: &mut GameState, caller: PlayerId) -> Result<Vec<GameEvent>, GameError> {
    if caller != state.creator {
        return Err(GameError::Forbidden("only the creator can delete the game".into()));
    }
    if !state.status.can_transition_to(GameStatus::Finished) {
        return Err(GameError::NotFound(format!("game {}", state.id)));
    }

    state.status = GameStatus::Finished;
    state.current = None;
    state.phase = None;

    Ok(vec![GameEvent::GameDeleted { game_id: state.id }])
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn turn_holder(state: &GameState, caller: PlayerId) -> Result<usize, GameError> {
    if !state.status.is_active() {
        return Err(GameError::Validation(format!(
            "game {} is {}, not active",
            state.id, state.status
        )));
    }
    match state.current {
        Some(seat) if state.seats.get(seat).map(|s| s.player_id) == Some(caller) => Ok(seat),
        _ => Err(GameError::Forbidden(format!("it is not {caller}'s turn"))),
    }
}

fn expect_phase(state: &GameState, allowed: &[TurnPhase]) -> Result<(), GameError> {
    match state.phase {
        Some(phase) if allowed.contains(&phase) => Ok(()),
        Some(phase) => Err(GameError::Validation(format!("not allowed during the {phase} phase"))),
        None => Err(GameError::Validation("no turn in progress".into())),
    }
}

fn hand_position(state: &GameState, seat: usize, card_id: CardId) -> Result<usize, GameError> {
    state.seats[seat]
        .hand_position(card_id)
        .ok_or_else(|| GameError::Forbidden(format!("card {card_id} is not in your hand")))
}
