//! Engine configuration.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use sixgun_protocol::GameId;

/// Tunables shared by every game a registry runs.
///
/// The defaults are the classic rules; tests usually only touch `seed`
/// and `shuffle_on_start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fewest seated players `start` accepts.
    pub min_players: usize,

    /// Most seated players a game holds.
    pub max_players: usize,

    /// Cards drawn by `start_turn`.
    pub cards_per_turn: usize,

    /// Health lost by a Bang! target without a Missed!.
    pub bang_damage: u32,

    /// Health gained from a Beer.
    pub beer_heal: u32,

    /// Upper bound for Beer healing. `None` means uncapped.
    pub beer_health_cap: Option<u32>,

    /// Dynamite explodes when a roll in `0..100` is below this.
    pub dynamite_threshold: u32,

    /// Health lost when Dynamite explodes.
    pub dynamite_damage: u32,

    /// A Barrel succeeds when a roll in `0..100` is below this.
    pub barrel_threshold: u32,

    /// Shuffle the freshly built deck once at start. When off, cards are
    /// drawn in catalogue order.
    pub shuffle_on_start: bool,

    /// Capacity of each game actor's command queue.
    pub command_channel_size: usize,

    /// Base seed for per-game RNGs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 7,
            cards_per_turn: 2,
            bang_damage: 1,
            beer_heal: 1,
            beer_health_cap: None,
            dynamite_threshold: 16,
            dynamite_damage: 3,
            barrel_threshold: 50,
            shuffle_on_start: true,
            command_channel_size: 64,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Builds the RNG a game owns. With a seed, the same game id always
    /// gets the same sequence.
    pub fn rng_for(&self, game_id: GameId) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ game_id.0),
            None => StdRng::seed_from_u64(rand::random()),
        }
    }
}
