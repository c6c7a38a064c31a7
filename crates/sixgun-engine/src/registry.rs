//! Game registry: creates, finds, and deletes game sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sixgun_broadcast::RoomBroadcaster;
use sixgun_protocol::{CardId, GameId, GameStatus, GameSummary, GameView, PlayerId};
use tokio::sync::RwLock;

use crate::game::{GameContext, GameHandle, spawn_game};
use crate::gateway::{PersistenceGateway, PlayerRecord};
use crate::{Catalogue, EngineConfig, GameError, GameState};

/// Owns every resident game and the lifetime of its actor.
///
/// The map lock is only held to look up, insert, or remove a handle, never
/// while a game is handling a command, so games never wait on each other.
pub struct GameRegistry<G: PersistenceGateway> {
    games: RwLock<HashMap<GameId, GameHandle>>,
    next_id: AtomicU64,
    ctx: GameContext<G>,
}

impl<G: PersistenceGateway> GameRegistry<G> {
    /// A registry with default rules and the classic catalogue.
    pub fn new(gateway: G, broadcaster: RoomBroadcaster) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            ctx: GameContext {
                gateway: Arc::new(gateway),
                broadcaster,
                config: Arc::new(EngineConfig::default()),
                catalogue: Arc::new(Catalogue::classic()),
            },
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.ctx.config = Arc::new(config);
        self
    }

    /// Replaces the card tables. Roles and characters still come from the
    /// gateway's `find_roles_available`/`find_characters_available`.
    pub fn with_catalogue(mut self, catalogue: Catalogue) -> Self {
        self.ctx.catalogue = Arc::new(catalogue);
        self
    }

    /// First id tried by [`create`](Self::create). Ids the gateway already
    /// holds are skipped either way; this only avoids probing them one by
    /// one.
    pub fn with_first_id(self, first: u64) -> Self {
        self.next_id.store(first, Ordering::Relaxed);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.ctx.gateway
    }

    pub fn broadcaster(&self) -> &RoomBroadcaster {
        &self.ctx.broadcaster
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    /// Creates a waiting game with `creator` in the first seat.
    pub async fn create(&self, name: &str, creator: PlayerId) -> Result<GameId, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::Validation("game name must not be empty".into()));
        }

        let game_id = self.allocate_id().await?;
        let state = GameState::new(game_id, name, creator);

        self.ctx.gateway.save_session(&state).await?;
        let record = PlayerRecord {
            game_id,
            player_id: creator,
            seat: 0,
        };
        if let Err(e) = self.ctx.gateway.append_user_record(record).await {
            tracing::warn!(%game_id, error = %e, "creator record not stored, game discarded");
            if let Err(cleanup) = self.ctx.gateway.delete_session(game_id).await {
                tracing::warn!(%game_id, error = %cleanup, "could not discard unrecorded game");
            }
            return Err(e.into());
        }

        let handle = spawn_game(state, self.ctx.clone());
        self.games.write().await.insert(game_id, handle);
        tracing::info!(%game_id, %creator, name, "game created");
        Ok(game_id)
    }

    /// Next id the gateway does not already hold, so games stored by an
    /// earlier run are never overwritten.
    async fn allocate_id(&self) -> Result<GameId, GameError> {
        loop {
            let game_id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
            if self.ctx.gateway.load_session(game_id).await?.is_none() {
                return Ok(game_id);
            }
            tracing::debug!(%game_id, "id already stored, skipping");
        }
    }

    /// Returns the handle of a game, loading it from the gateway if it is
    /// not resident.
    pub async fn get(&self, game_id: GameId) -> Result<GameHandle, GameError> {
        if let Some(handle) = self.games.read().await.get(&game_id) {
            return Ok(handle.clone());
        }

        let state = self
            .ctx
            .gateway
            .load_session(game_id)
            .await?
            .filter(|s| s.status != GameStatus::Finished)
            .ok_or_else(|| GameError::NotFound(format!("game {game_id}")))?;

        let mut games = self.games.write().await;
        // Another caller may have loaded it while we were reading.
        let handle = games
            .entry(game_id)
            .or_insert_with(|| {
                tracing::info!(%game_id, "game rehydrated");
                spawn_game(state, self.ctx.clone())
            })
            .clone();
        Ok(handle)
    }

    /// Deletes a game. Only its creator may do this.
    ///
    /// Subscribers get a final `game_deleted` and are then dropped from the
    /// room. A second delete of the same game fails with `NotFound`.
    pub async fn delete(&self, game_id: GameId, caller: PlayerId) -> Result<(), GameError> {
        let handle = self.get(game_id).await?;
        handle.finish(caller).await?;
        self.games.write().await.remove(&game_id);
        Ok(())
    }

    /// Summaries of every resident game, ordered by id.
    pub async fn list(&self) -> Vec<GameSummary> {
        let handles: Vec<GameHandle> = self.games.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            // A game deleted meanwhile simply drops out of the list.
            if let Ok(summary) = handle.summary().await {
                summaries.push(summary);
            }
        }
        summaries.sort_by_key(|s| s.game_id);
        summaries
    }

    /// Number of resident games.
    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    // -----------------------------------------------------------------------
    // Pass-throughs
    // -----------------------------------------------------------------------

    pub async fn join(&self, game_id: GameId, player: PlayerId) -> Result<(), GameError> {
        self.get(game_id).await?.join(player).await
    }

    pub async fn start(&self, game_id: GameId, caller: PlayerId) -> Result<(), GameError> {
        self.get(game_id).await?.start(caller).await
    }

    pub async fn start_turn(&self, game_id: GameId, caller: PlayerId) -> Result<(), GameError> {
        self.get(game_id).await?.start_turn(caller).await
    }

    pub async fn play_card(
        &self,
        game_id: GameId,
        caller: PlayerId,
        card_id: CardId,
        target: Option<PlayerId>,
    ) -> Result<(), GameError> {
        self.get(game_id)
            .await?
            .play_card(caller, card_id, target)
            .await
    }

    pub async fn discard(
        &self,
        game_id: GameId,
        caller: PlayerId,
        card_id: CardId,
    ) -> Result<(), GameError> {
        self.get(game_id).await?.discard(caller, card_id).await
    }

    pub async fn end_turn(&self, game_id: GameId, caller: PlayerId) -> Result<(), GameError> {
        self.get(game_id).await?.end_turn(caller).await
    }

    pub async fn view(&self, game_id: GameId, viewer: PlayerId) -> Result<GameView, GameError> {
        self.get(game_id).await?.view(viewer).await
    }

    pub async fn snapshot(&self, game_id: GameId) -> Result<GameState, GameError> {
        self.get(game_id).await?.snapshot().await
    }
}
