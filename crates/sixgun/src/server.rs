//! `SixgunServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → engine, with the room
//! broadcaster pushing game events back out over the same connections.

use std::sync::Arc;
use std::time::Duration;

use sixgun_broadcast::{BroadcastConfig, RoomBroadcaster};
use sixgun_engine::{Catalogue, EngineConfig, GameRegistry, PersistenceGateway};
use sixgun_protocol::{Codec, JsonCodec};
use sixgun_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{Authenticator, SixgunError};

/// Clients must send this version in their handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared by every connection task.
pub(crate) struct ServerState<G: PersistenceGateway, A: Authenticator, C: Codec> {
    pub(crate) registry: GameRegistry<G>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Timeouts {
    pub(crate) handshake: Duration,
    pub(crate) idle: Duration,
}

/// Builder for configuring and starting a Sixgun server.
///
/// ```rust,ignore
/// use sixgun::prelude::*;
///
/// let server = SixgunServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(InMemoryGateway::default(), my_auth)
///     .await?;
/// server.run().await
/// ```
pub struct SixgunServerBuilder {
    bind_addr: String,
    engine_config: EngineConfig,
    broadcast_config: BroadcastConfig,
    catalogue: Catalogue,
    handshake_timeout: Duration,
    idle_timeout: Duration,
}

impl SixgunServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            engine_config: EngineConfig::default(),
            broadcast_config: BroadcastConfig::default(),
            catalogue: Catalogue::classic(),
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn broadcast_config(mut self, config: BroadcastConfig) -> Self {
        self.broadcast_config = config;
        self
    }

    /// Cards the games are dealt from.
    ///
    /// Roles and characters are served by the gateway, not by this
    /// catalogue. Build the gateway from the same catalogue (for example
    /// `InMemoryGateway::new(&catalogue)`) or the two will disagree.
    pub fn catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// How long a new connection may take to send its handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// A connection that sends nothing for this long is closed.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and spawns the room broadcaster.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build<G, A>(
        self,
        gateway: G,
        auth: A,
    ) -> Result<SixgunServer<G, A, JsonCodec>, SixgunError>
    where
        G: PersistenceGateway,
        A: Authenticator,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let broadcaster = RoomBroadcaster::spawn(self.broadcast_config);
        let registry = GameRegistry::new(gateway, broadcaster)
            .with_config(self.engine_config)
            .with_catalogue(self.catalogue);

        let state = Arc::new(ServerState {
            registry,
            auth,
            codec: JsonCodec,
            timeouts: Timeouts {
                handshake: self.handshake_timeout,
                idle: self.idle_timeout,
            },
        });

        Ok(SixgunServer { transport, state })
    }
}

impl Default for SixgunServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Sixgun server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct SixgunServer<G: PersistenceGateway, A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<G, A, C>>,
}

impl<G, A, C> SixgunServer<G, A, C>
where
    G: PersistenceGateway,
    A: Authenticator,
    C: Codec,
{
    pub fn builder() -> SixgunServerBuilder {
        SixgunServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The game registry behind this server, for embedding applications
    /// that also drive games outside the socket protocol.
    pub fn registry(&self) -> &GameRegistry<G> {
        &self.state.registry
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), SixgunError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "sixgun server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
