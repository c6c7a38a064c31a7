//! Dealing secret roles and characters at game start.

use rand::Rng;
use rand::seq::SliceRandom;
use sixgun_protocol::PlayerId;

use crate::{CharacterDef, GameError, RoleDef};

/// What one seat was dealt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub player_id: PlayerId,
    pub role: RoleDef,
    pub character: CharacterDef,
    /// Character health, plus one for the Sheriff.
    pub health: u32,
}

/// Pairs every seat with one role and one character.
///
/// `roles` is cut to the first `seating.len()` entries before shuffling so
/// the role mix depends only on the table size. `characters` is the game's
/// whole unused pool; it is shuffled and the first `seating.len()` are
/// dealt.
pub fn assign<R: Rng + ?Sized>(
    seating: &[PlayerId],
    mut roles: Vec<RoleDef>,
    mut characters: Vec<CharacterDef>,
    rng: &mut R,
) -> Result<Vec<Assignment>, GameError> {
    let n = seating.len();
    if roles.len() < n {
        return Err(GameError::InsufficientResources(format!(
            "{} roles available for {n} players",
            roles.len()
        )));
    }
    if characters.len() < n {
        return Err(GameError::InsufficientResources(format!(
            "{} characters available for {n} players",
            characters.len()
        )));
    }

    roles.truncate(n);
    roles.shuffle(rng);
    characters.shuffle(rng);

    Ok(seating
        .iter()
        .zip(roles)
        .zip(characters)
        .map(|((&player_id, role), character)| {
            let health = character.health + u32::from(role.is_sheriff());
            Assignment {
                player_id,
                role,
                character,
                health,
            }
        })
        .collect())
}
