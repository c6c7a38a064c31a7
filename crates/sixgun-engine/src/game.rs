//! Game actor: one Tokio task per game session.
//!
//! The actor is the only owner of its [`GameState`]. Commands arrive on a
//! bounded mpsc channel and are handled strictly one after another, which
//! is what makes "exactly one active turn" hold no matter how many
//! connections hit the same game at once.
//!
//! A mutating command runs against a draft copy of the state. The draft is
//! saved through the gateway and only then becomes the live state; its
//! events are published after that. Any failure along the way drops the
//! draft, so callers see either the whole operation or none of it.

use std::sync::Arc;

use rand::rngs::StdRng;
use sixgun_broadcast::RoomBroadcaster;
use sixgun_protocol::{CardId, GameEvent, GameId, GameSummary, GameView, PlayerId};
use tokio::sync::{mpsc, oneshot};

use crate::gateway::{PersistenceGateway, PlayerRecord};
use crate::{Catalogue, EngineConfig, GameError, GameState, machine};

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Commands sent to a game actor through its channel.
pub(crate) enum GameCommand {
    Join {
        player: PlayerId,
        reply: Reply<()>,
    },
    Start {
        caller: PlayerId,
        reply: Reply<()>,
    },
    StartTurn {
        caller: PlayerId,
        reply: Reply<()>,
    },
    PlayCard {
        caller: PlayerId,
        card_id: CardId,
        target: Option<PlayerId>,
        reply: Reply<()>,
    },
    Discard {
        caller: PlayerId,
        card_id: CardId,
        reply: Reply<()>,
    },
    EndTurn {
        caller: PlayerId,
        reply: Reply<()>,
    },
    /// Finish and delete the game. The actor stops after a successful
    /// finish.
    Finish {
        caller: PlayerId,
        reply: Reply<()>,
    },
    View {
        viewer: PlayerId,
        reply: oneshot::Sender<GameView>,
    },
    Snapshot {
        reply: oneshot::Sender<GameState>,
    },
    Summary {
        reply: oneshot::Sender<GameSummary>,
    },
}

/// What a game actor shares with its registry.
pub(crate) struct GameContext<G> {
    pub gateway: Arc<G>,
    pub broadcaster: RoomBroadcaster,
    pub config: Arc<EngineConfig>,
    pub catalogue: Arc<Catalogue>,
}

impl<G> Clone for GameContext<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            broadcaster: self.broadcaster.clone(),
            config: Arc::clone(&self.config),
            catalogue: Arc::clone(&self.catalogue),
        }
    }
}

/// Handle to a running game actor.
///
/// Cheap to clone. Once the actor has stopped (the game was deleted) every
/// call fails with [`GameError::NotFound`].
#[derive(Clone, Debug)]
pub struct GameHandle {
    game_id: GameId,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub async fn join(&self, player: PlayerId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::Join { player, reply }).await
    }

    pub async fn start(&self, caller: PlayerId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::Start { caller, reply }).await
    }

    pub async fn start_turn(&self, caller: PlayerId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::StartTurn { caller, reply })
            .await
    }

    pub async fn play_card(
        &self,
        caller: PlayerId,
        card_id: CardId,
        target: Option<PlayerId>,
    ) -> Result<(), GameError> {
        self.call(|reply| GameCommand::PlayCard {
            caller,
            card_id,
            target,
            reply,
        })
        .await
    }

    pub async fn discard(&self, caller: PlayerId, card_id: CardId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::Discard {
            caller,
            card_id,
            reply,
        })
        .await
    }

    pub async fn end_turn(&self, caller: PlayerId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::EndTurn { caller, reply })
            .await
    }

    pub(crate) async fn finish(&self, caller: PlayerId) -> Result<(), GameError> {
        self.call(|reply| GameCommand::Finish { caller, reply }).await
    }

    /// The game as `viewer` may see it.
    pub async fn view(&self, viewer: PlayerId) -> Result<GameView, GameError> {
        self.query(|reply| GameCommand::View { viewer, reply })
            .await
    }

    /// A full copy of the state, secrets included.
    pub async fn snapshot(&self) -> Result<GameState, GameError> {
        self.query(|reply| GameCommand::Snapshot { reply }).await
    }

    pub async fn summary(&self) -> Result<GameSummary, GameError> {
        self.query(|reply| GameCommand::Summary { reply }).await
    }

    async fn call(
        &self,
        make: impl FnOnce(Reply<()>) -> GameCommand,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())?
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> GameCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }

    fn gone(&self) -> GameError {
        GameError::NotFound(format!("game {}", self.game_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor<G> {
    state: GameState,
    rng: StdRng,
    ctx: GameContext<G>,
    receiver: mpsc::Receiver<GameCommand>,
}

impl<G: PersistenceGateway> GameActor<G> {
    async fn run(mut self) {
        let game_id = self.state.id;
        tracing::info!(%game_id, "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::Join { player, reply } => {
                    let result = self.handle_join(player).await;
                    let _ = reply.send(result);
                }
                GameCommand::Start { caller, reply } => {
                    let result = self.handle_start(caller).await;
                    let _ = reply.send(result);
                }
                GameCommand::StartTurn { caller, reply } => {
                    let result = self
                        .apply("start_turn", caller, |state, config, _, rng| {
                            machine::start_turn(state, config, caller, rng)
                        })
                        .await;
                    let _ = reply.send(result);
                }
                GameCommand::PlayCard {
                    caller,
                    card_id,
                    target,
                    reply,
                } => {
                    let result = self
                        .apply("play_card", caller, |state, config, _, rng| {
                            machine::play_card(state, config, caller, card_id, target, rng)
                        })
                        .await;
                    let _ = reply.send(result);
                }
                GameCommand::Discard {
                    caller,
                    card_id,
                    reply,
                } => {
                    let result = self
                        .apply("discard", caller, |state, _, _, _| {
                            machine::discard(state, caller, card_id)
                        })
                        .await;
                    let _ = reply.send(result);
                }
                GameCommand::EndTurn { caller, reply } => {
                    let result = self
                        .apply("end_turn", caller, |state, _, _, _| {
                            machine::end_turn(state, caller)
                        })
                        .await;
                    let _ = reply.send(result);
                }
                GameCommand::Finish { caller, reply } => {
                    let result = self.handle_finish(caller).await;
                    let done = result.is_ok();
                    let _ = reply.send(result);
                    if done {
                        break;
                    }
                }
                GameCommand::View { viewer, reply } => {
                    let _ = reply.send(self.state.view(viewer));
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.state.clone());
                }
                GameCommand::Summary { reply } => {
                    let _ = reply.send(self.state.summary());
                }
            }
        }

        tracing::info!(%game_id, "game actor stopped");
    }

    async fn handle_join(&mut self, player: PlayerId) -> Result<(), GameError> {
        let mut draft = self.state.clone();
        let events = self.reject_logged("join", player, machine::join(&mut draft, &self.ctx.config, player))?;

        let record = PlayerRecord {
            game_id: draft.id,
            player_id: player,
            seat: draft.seats.len() - 1,
        };
        if let Err(e) = self.ctx.gateway.save_session(&draft).await {
            tracing::warn!(game_id = %draft.id, error = %e, "save failed, draft discarded");
            return Err(e.into());
        }
        if let Err(e) = self.ctx.gateway.append_user_record(record).await {
            tracing::warn!(game_id = %draft.id, %player, error = %e, "player record not stored, join undone");
            if let Err(restore) = self.ctx.gateway.save_session(&self.state).await {
                tracing::warn!(game_id = %self.state.id, error = %restore, "could not restore session");
            }
            return Err(e.into());
        }

        self.state = draft;
        self.publish(events);
        tracing::info!(
            game_id = %self.state.id,
            %player,
            players = self.state.seats.len(),
            "player joined"
        );
        Ok(())
    }

    async fn handle_start(&mut self, caller: PlayerId) -> Result<(), GameError> {
        self.reject_logged("start", caller, machine::check_start(&self.state, &self.ctx.config, caller))?;

        let n = self.state.seats.len();
        let roles = self.ctx.gateway.find_roles_available(n).await?;
        let characters = self
            .ctx
            .gateway
            .find_characters_available(self.state.id, n)
            .await?;

        self.apply("start", caller, |state, config, catalogue, rng| {
            machine::start(state, config, catalogue, caller, roles, characters, rng)
        })
        .await?;

        tracing::info!(game_id = %self.state.id, players = n, "game started");
        Ok(())
    }

    async fn handle_finish(&mut self, caller: PlayerId) -> Result<(), GameError> {
        let mut draft = self.state.clone();
        let events = self.reject_logged("delete", caller, machine::finish(&mut draft, caller))?;

        if let Err(e) = self.ctx.gateway.delete_session(draft.id).await {
            tracing::warn!(game_id = %draft.id, error = %e, "delete failed, game kept");
            return Err(e.into());
        }

        self.state = draft;
        self.publish(events);
        if let Err(e) = self.ctx.broadcaster.close_room(self.state.id) {
            tracing::warn!(game_id = %self.state.id, error = %e, "could not close room");
        }
        tracing::info!(game_id = %self.state.id, "game deleted");
        Ok(())
    }

    /// Runs `op` on a draft of the state and commits it if it succeeds.
    async fn apply<F>(&mut self, action: &str, caller: PlayerId, op: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut GameState, &EngineConfig, &Catalogue, &mut StdRng) -> Result<Vec<GameEvent>, GameError>,
    {
        let mut draft = self.state.clone();
        let mut rng = self.rng.clone();
        let result = op(&mut draft, &*self.ctx.config, &*self.ctx.catalogue, &mut rng);
        let events = self.reject_logged(action, caller, result)?;
        self.commit(draft, rng, events).await
    }

    /// Saves `draft`, makes it live, then publishes `events`.
    async fn commit(
        &mut self,
        draft: GameState,
        rng: StdRng,
        events: Vec<GameEvent>,
    ) -> Result<(), GameError> {
        if let Err(e) = self.ctx.gateway.save_session(&draft).await {
            tracing::warn!(game_id = %draft.id, error = %e, "save failed, draft discarded");
            return Err(e.into());
        }
        self.state = draft;
        self.rng = rng;
        self.publish(events);
        Ok(())
    }

    fn publish(&self, events: Vec<GameEvent>) {
        for event in events {
            if let Err(e) = self.ctx.broadcaster.publish(self.state.id, event) {
                tracing::warn!(game_id = %self.state.id, error = %e, "event dropped");
            }
        }
    }

    fn reject_logged<T>(
        &self,
        action: &str,
        caller: PlayerId,
        result: Result<T, GameError>,
    ) -> Result<T, GameError> {
        if let Err(e) = &result {
            tracing::debug!(game_id = %self.state.id, %caller, action, error = %e, "rejected");
        }
        result
    }
}

/// Spawns a game actor for `state` and returns a handle to it.
pub(crate) fn spawn_game<G: PersistenceGateway>(state: GameState, ctx: GameContext<G>) -> GameHandle {
    let (tx, rx) = mpsc::channel(ctx.config.command_channel_size.max(1));
    let game_id = state.id;

    let actor = GameActor {
        rng: ctx.config.rng_for(game_id),
        state,
        ctx,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    GameHandle {
        game_id,
        sender: tx,
    }
}
