//! Persistence boundary.
//!
//! The engine never talks to storage directly. It goes through a
//! [`PersistenceGateway`], which the embedding application implements on
//! top of whatever database it uses. [`InMemoryGateway`] is enough for
//! tests and single-process deployments.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sixgun_protocol::{GameId, PlayerId};

use crate::{Catalogue, CharacterDef, GameState, RoleDef};

/// Errors reported by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The backend could not be reached or refused the write.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be read back.
    #[error("corrupt record for game {0}")]
    Corrupt(GameId),
}

/// A seated player, as recorded for history and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub seat: usize,
}

/// Storage operations the engine needs.
///
/// Every method is async and must be `Send` so game actors can await it
/// from any runtime thread.
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Loads a session that is not resident in memory. `Ok(None)` means
    /// the game does not exist.
    fn load_session(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<Option<GameState>, GatewayError>> + Send;

    /// Stores the full session after a successful operation.
    fn save_session(
        &self,
        state: &GameState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn delete_session(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Records that a player took a seat.
    fn append_user_record(
        &self,
        record: PlayerRecord,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// The first `n` roles of the role table. Fewer than `n` means the
    /// table cannot be dealt.
    fn find_roles_available(
        &self,
        n: usize,
    ) -> impl Future<Output = Result<Vec<RoleDef>, GatewayError>> + Send;

    /// Every character not already used in `game_id`. `n` is the number
    /// the caller is about to deal.
    fn find_characters_available(
        &self,
        game_id: GameId,
        n: usize,
    ) -> impl Future<Output = Result<Vec<CharacterDef>, GatewayError>> + Send;
}

/// Lets several registries (or a registry and the application) share one
/// backend.
impl<T: PersistenceGateway> PersistenceGateway for Arc<T> {
    fn load_session(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<Option<GameState>, GatewayError>> + Send {
        (**self).load_session(game_id)
    }

    fn save_session(
        &self,
        state: &GameState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).save_session(state)
    }

    fn delete_session(
        &self,
        game_id: GameId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).delete_session(game_id)
    }

    fn append_user_record(
        &self,
        record: PlayerRecord,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).append_user_record(record)
    }

    fn find_roles_available(
        &self,
        n: usize,
    ) -> impl Future<Output = Result<Vec<RoleDef>, GatewayError>> + Send {
        (**self).find_roles_available(n)
    }

    fn find_characters_available(
        &self,
        game_id: GameId,
        n: usize,
    ) -> impl Future<Output = Result<Vec<CharacterDef>, GatewayError>> + Send {
        (**self).find_characters_available(game_id, n)
    }
}

// ---------------------------------------------------------------------------
// InMemoryGateway
// ---------------------------------------------------------------------------

/// A gateway that keeps everything in process memory.
pub struct InMemoryGateway {
    sessions: Mutex<HashMap<GameId, GameState>>,
    records: Mutex<Vec<PlayerRecord>>,
    roles: Vec<RoleDef>,
    characters: Vec<CharacterDef>,
}

impl InMemoryGateway {
    /// A gateway serving the roles and characters of `catalogue`.
    pub fn new(catalogue: &Catalogue) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            records: Mutex::new(Vec::new()),
            roles: catalogue.roles.clone(),
            characters: catalogue.characters.clone(),
        }
    }

    /// Player records appended so far, oldest first.
    pub fn records(&self) -> Result<Vec<PlayerRecord>, GatewayError> {
        Ok(lock(&self.records)?.clone())
    }

    pub fn session_count(&self) -> Result<usize, GatewayError> {
        Ok(lock(&self.sessions)?.len())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new(&Catalogue::classic())
    }
}

impl PersistenceGateway for InMemoryGateway {
    async fn load_session(&self, game_id: GameId) -> Result<Option<GameState>, GatewayError> {
        Ok(lock(&self.sessions)?.get(&game_id).cloned())
    }

    async fn save_session(&self, state: &GameState) -> Result<(), GatewayError> {
        lock(&self.sessions)?.insert(state.id, state.clone());
        Ok(())
    }

    async fn delete_session(&self, game_id: GameId) -> Result<(), GatewayError> {
        lock(&self.sessions)?.remove(&game_id);
        Ok(())
    }

    async fn append_user_record(&self, record: PlayerRecord) -> Result<(), GatewayError> {
        lock(&self.records)?.push(record);
        Ok(())
    }

    async fn find_roles_available(&self, n: usize) -> Result<Vec<RoleDef>, GatewayError> {
        Ok(self.roles.iter().take(n).cloned().collect())
    }

    async fn find_characters_available(
        &self,
        game_id: GameId,
        _n: usize,
    ) -> Result<Vec<CharacterDef>, GatewayError> {
        let sessions = lock(&self.sessions)?;
        let used: HashSet<&str> = sessions
            .get(&game_id)
            .map(|s| s.seats.iter().filter_map(|seat| seat.character.as_deref()).collect())
            .unwrap_or_default();

        Ok(self
            .characters
            .iter()
            .filter(|c| !used.contains(c.name.as_str()))
            .cloned()
            .collect())
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, GatewayError> {
    m.lock()
        .map_err(|_| GatewayError::Unavailable("in-memory store poisoned".into()))
}
