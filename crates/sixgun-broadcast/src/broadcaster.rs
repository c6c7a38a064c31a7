//! The room broadcaster: a dispatcher actor that owns every room's
//! subscriber set.
//!
//! Callers talk to it through [`RoomBroadcaster`], which only enqueues
//! commands. Commands are processed one at a time in arrival order, so a
//! `subscribe` followed by a `publish` from the same task is always
//! observed in that order.

use std::collections::HashMap;
use std::sync::Arc;

use sixgun_protocol::{EventEnvelope, GameEvent, GameId};
use sixgun_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{BroadcastConfig, BroadcastError, EventReceiver, Subscriber};

/// Commands handled by the dispatcher task.
enum DispatchCommand {
    Subscribe {
        game_id: GameId,
        subscriber: Subscriber,
    },
    Unsubscribe {
        game_id: GameId,
        conn_id: ConnectionId,
    },
    UnsubscribeAll {
        conn_id: ConnectionId,
    },
    CloseRoom {
        game_id: GameId,
    },
    Publish {
        envelope: Arc<EventEnvelope>,
    },
    Count {
        game_id: GameId,
        reply: oneshot::Sender<usize>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the dispatcher. Cheap to clone; every clone feeds the same
/// dispatcher.
#[derive(Clone)]
pub struct RoomBroadcaster {
    tx: mpsc::UnboundedSender<DispatchCommand>,
    config: BroadcastConfig,
}

impl RoomBroadcaster {
    /// Spawns the dispatcher task on the current Tokio runtime.
    pub fn spawn(config: BroadcastConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher {
            rooms: HashMap::new(),
            receiver: rx,
        };
        tokio::spawn(dispatcher.run());
        Self { tx, config }
    }

    /// Creates a subscriber queue for `conn_id` sized from the config.
    pub fn subscriber(&self, conn_id: ConnectionId) -> (Subscriber, EventReceiver) {
        Subscriber::channel(conn_id, self.config.subscriber_queue)
    }

    /// Registers `subscriber` for the events of `game_id`. Subscribing the
    /// same connection twice replaces the earlier queue.
    pub fn subscribe(&self, game_id: GameId, subscriber: Subscriber) -> Result<(), BroadcastError> {
        self.send(DispatchCommand::Subscribe {
            game_id,
            subscriber,
        })
    }

    pub fn unsubscribe(&self, game_id: GameId, conn_id: ConnectionId) -> Result<(), BroadcastError> {
        self.send(DispatchCommand::Unsubscribe { game_id, conn_id })
    }

    /// Drops `conn_id` from every room it subscribed to.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) -> Result<(), BroadcastError> {
        self.send(DispatchCommand::UnsubscribeAll { conn_id })
    }

    /// Forgets a room and all of its subscribers.
    pub fn close_room(&self, game_id: GameId) -> Result<(), BroadcastError> {
        self.send(DispatchCommand::CloseRoom { game_id })
    }

    /// Queues `event` for the subscribers of `game_id` and returns at once.
    pub fn publish(&self, game_id: GameId, event: GameEvent) -> Result<(), BroadcastError> {
        self.send(DispatchCommand::Publish {
            envelope: Arc::new(EventEnvelope::new(game_id, event)),
        })
    }

    /// Number of connections currently subscribed to `game_id`.
    pub async fn subscriber_count(&self, game_id: GameId) -> Result<usize, BroadcastError> {
        let (reply, rx) = oneshot::channel();
        self.send(DispatchCommand::Count { game_id, reply })?;
        rx.await.map_err(|_| BroadcastError::Unavailable)
    }

    /// Resolves once every command queued before it has been processed.
    pub async fn flush(&self) -> Result<(), BroadcastError> {
        let (reply, rx) = oneshot::channel();
        self.send(DispatchCommand::Flush { reply })?;
        rx.await.map_err(|_| BroadcastError::Unavailable)
    }

    fn send(&self, cmd: DispatchCommand) -> Result<(), BroadcastError> {
        self.tx.send(cmd).map_err(|_| BroadcastError::Unavailable)
    }
}

/// Owns `game → {connection → subscriber}`. Runs inside a Tokio task.
struct Dispatcher {
    rooms: HashMap<GameId, HashMap<ConnectionId, Subscriber>>,
    receiver: mpsc::UnboundedReceiver<DispatchCommand>,
}

impl Dispatcher {
    async fn run(mut self) {
        tracing::debug!("broadcast dispatcher started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                DispatchCommand::Subscribe {
                    game_id,
                    subscriber,
                } => {
                    let conn_id = subscriber.conn_id();
                    self.rooms
                        .entry(game_id)
                        .or_default()
                        .insert(conn_id, subscriber);
                    tracing::debug!(%game_id, %conn_id, "subscribed");
                }
                DispatchCommand::Unsubscribe { game_id, conn_id } => {
                    self.remove(game_id, conn_id);
                }
                DispatchCommand::UnsubscribeAll { conn_id } => {
                    for subscribers in self.rooms.values_mut() {
                        subscribers.remove(&conn_id);
                    }
                    self.rooms.retain(|_, subscribers| !subscribers.is_empty());
                }
                DispatchCommand::CloseRoom { game_id } => {
                    if let Some(subscribers) = self.rooms.remove(&game_id) {
                        tracing::debug!(%game_id, dropped = subscribers.len(), "room closed");
                    }
                }
                DispatchCommand::Publish { envelope } => {
                    self.dispatch(envelope);
                }
                DispatchCommand::Count { game_id, reply } => {
                    let count = self.rooms.get(&game_id).map_or(0, HashMap::len);
                    let _ = reply.send(count);
                }
                DispatchCommand::Flush { reply } => {
                    let _ = reply.send(());
                }
            }
        }

        tracing::debug!("broadcast dispatcher stopped");
    }

    /// Delivers one envelope to its room. Failing subscribers are dropped;
    /// the rest still receive the event.
    fn dispatch(&mut self, envelope: Arc<EventEnvelope>) {
        let game_id = envelope.game_id;
        let Some(subscribers) = self.rooms.get(&game_id) else {
            tracing::trace!(%game_id, event = envelope.event.kind(), "no subscribers");
            return;
        };

        let mut failed = Vec::new();
        for subscriber in subscribers.values() {
            if let Err(e) = subscriber.deliver(&envelope) {
                tracing::warn!(%game_id, error = %e, "dropping subscriber");
                failed.push(subscriber.conn_id());
            }
        }

        tracing::debug!(
            %game_id,
            event = envelope.event.kind(),
            delivered = subscribers.len() - failed.len(),
            "event published"
        );

        for conn_id in failed {
            self.remove(game_id, conn_id);
        }
    }

    fn remove(&mut self, game_id: GameId, conn_id: ConnectionId) {
        if let Some(subscribers) = self.rooms.get_mut(&game_id) {
            subscribers.remove(&conn_id);
            if subscribers.is_empty() {
                self.rooms.remove(&game_id);
            }
        }
    }
}
