//! Per-connection handler: handshake, request routing, and event push.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//!   1. Receive `handshake` → check version, authenticate → `welcome`
//!   2. Loop: receive a request → run it against the registry → reply
//!
//! Once the connection subscribes to a room, a second task drains its event
//! queue onto the socket, so pushed events interleave with replies.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sixgun_broadcast::{EventReceiver, Subscriber};
use sixgun_engine::{GameError, PersistenceGateway};
use sixgun_protocol::{ClientRequest, Codec, PlayerId, ProtocolError, ServerReply};
use sixgun_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::task::JoinHandle;

use crate::server::{PROTOCOL_VERSION, ServerState};
use crate::{Authenticator, SixgunError};

/// The connection's room subscriptions and the task feeding them to the
/// socket. Dropping it leaves every room, even if the handler panicked.
struct Subscriptions<G: PersistenceGateway, A: Authenticator, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<G, A, C>>,
    subscriber: Option<Subscriber>,
    writer: Option<JoinHandle<()>>,
}

impl<G: PersistenceGateway, A: Authenticator, C: Codec> Subscriptions<G, A, C> {
    fn new(conn_id: ConnectionId, state: Arc<ServerState<G, A, C>>) -> Self {
        Self {
            conn_id,
            state,
            subscriber: None,
            writer: None,
        }
    }

    /// The connection's subscriber, starting the writer task on first use.
    fn subscriber(&mut self, conn: &Arc<WebSocketConnection>) -> Subscriber {
        if let Some(subscriber) = &self.subscriber {
            return subscriber.clone();
        }

        let (subscriber, events) = self.state.registry.broadcaster().subscriber(self.conn_id);
        self.writer = Some(spawn_event_writer(
            Arc::clone(conn),
            Arc::clone(&self.state),
            events,
        ));
        self.subscriber = Some(subscriber.clone());
        subscriber
    }
}

impl<G: PersistenceGateway, A: Authenticator, C: Codec> Drop for Subscriptions<G, A, C> {
    fn drop(&mut self) {
        if self.subscriber.is_some() {
            let _ = self.state.registry.broadcaster().unsubscribe_all(self.conn_id);
        }
        if let Some(writer) = self.writer.take() {
            writer.abort();
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G, A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<G, A, C>>,
) -> Result<(), SixgunError>
where
    G: PersistenceGateway,
    A: Authenticator,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let player_id = perform_handshake(&conn, &state).await?;
    tracing::info!(%conn_id, %player_id, "player authenticated");

    let mut subs = Subscriptions::new(conn_id, Arc::clone(&state));

    loop {
        let data = match tokio::time::timeout(state.timeouts.idle, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode request");
                send_error(&conn, &state.codec, 400, &format!("invalid request: {e}")).await?;
                continue;
            }
        };

        let reply = match dispatch(&conn, &state, &mut subs, player_id, request).await {
            Ok(reply) => reply,
            Err(e) => ServerReply::Error {
                code: e.code(),
                message: e.to_string(),
            },
        };
        send_reply(&conn, &state.codec, &reply).await?;
    }

    // `subs` drops here → leaves every room and stops the writer.
    Ok(())
}

/// Receives the handshake, checks the version, and authenticates the token.
async fn perform_handshake<G, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<G, A, C>,
) -> Result<PlayerId, SixgunError>
where
    G: PersistenceGateway,
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(state.timeouts.handshake, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before handshake".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let (version, token) = match state.codec.decode(&data) {
        Ok(ClientRequest::Handshake { version, token }) => (version, token),
        _ => {
            send_error(conn, &state.codec, 400, "expected handshake").await?;
            return Err(
                ProtocolError::InvalidMessage("first message must be a handshake".into()).into(),
            );
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            conn,
            &state.codec,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )
        .await?;
        return Err(ProtocolError::InvalidMessage("protocol version mismatch".into()).into());
    }

    let player_id = match state.auth.authenticate(token.as_deref().unwrap_or("")).await {
        Ok(player_id) => player_id,
        Err(e) => {
            send_error(conn, &state.codec, 401, "unauthorized").await?;
            return Err(e.into());
        }
    };

    let welcome = ServerReply::Welcome {
        player_id,
        server_time: unix_millis(),
    };
    send_reply(conn, &state.codec, &welcome).await?;

    Ok(player_id)
}

/// Runs one request on behalf of `player_id`.
async fn dispatch<G, A, C>(
    conn: &Arc<WebSocketConnection>,
    state: &ServerState<G, A, C>,
    subs: &mut Subscriptions<G, A, C>,
    player_id: PlayerId,
    request: ClientRequest,
) -> Result<ServerReply, GameError>
where
    G: PersistenceGateway,
    A: Authenticator,
    C: Codec,
{
    let registry = &state.registry;

    match request {
        ClientRequest::Handshake { .. } => {
            Err(GameError::Validation("already handshaken".into()))
        }

        ClientRequest::CreateGame { name } => {
            let game_id = registry.create(&name, player_id).await?;
            Ok(ServerReply::GameCreated { game_id })
        }

        ClientRequest::ListGames => Ok(ServerReply::Games {
            games: registry.list().await,
        }),

        ClientRequest::GameDetails { game_id } => Ok(ServerReply::Details {
            view: registry.view(game_id, player_id).await?,
        }),

        ClientRequest::JoinGame { game_id } => {
            registry.join(game_id, player_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::StartGame { game_id } => {
            registry.start(game_id, player_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::StartTurn { game_id } => {
            registry.start_turn(game_id, player_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::PlayCard {
            game_id,
            card_id,
            target_id,
        } => {
            registry
                .play_card(game_id, player_id, card_id, target_id)
                .await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::DiscardCard { game_id, card_id } => {
            registry.discard(game_id, player_id, card_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::EndTurn { game_id } => {
            registry.end_turn(game_id, player_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::DeleteGame { game_id } => {
            registry.delete(game_id, player_id).await?;
            Ok(ServerReply::Ok)
        }

        ClientRequest::Subscribe { game_id } => {
            // Rooms only exist for live games.
            registry.get(game_id).await?;
            let subscriber = subs.subscriber(conn);
            registry
                .broadcaster()
                .subscribe(game_id, subscriber)
                .map_err(|e| GameError::Internal(e.to_string()))?;
            tracing::debug!(%game_id, %player_id, conn_id = %conn.id(), "subscribed");
            Ok(ServerReply::Subscribed { game_id })
        }

        ClientRequest::Unsubscribe { game_id } => {
            registry
                .broadcaster()
                .unsubscribe(game_id, conn.id())
                .map_err(|e| GameError::Internal(e.to_string()))?;
            Ok(ServerReply::Ok)
        }
    }
}

/// Drains a connection's event queue onto its socket.
fn spawn_event_writer<G, A, C>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<G, A, C>>,
    mut events: EventReceiver,
) -> JoinHandle<()>
where
    G: PersistenceGateway,
    A: Authenticator,
    C: Codec,
{
    tokio::spawn(async move {
        while let Some(envelope) = events.recv().await {
            let bytes = match state.codec.encode(&*envelope) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(game_id = %envelope.game_id, error = %e, "failed to encode event");
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(conn_id = %conn.id(), error = %e, "event push failed");
                break;
            }
        }
    })
}

async fn send_reply(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    reply: &ServerReply,
) -> Result<(), SixgunError> {
    let bytes = codec.encode(reply)?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), SixgunError> {
    let reply = ServerReply::Error {
        code,
        message: message.to_string(),
    };
    send_reply(conn, codec, &reply).await
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
