//! Runs a Sixgun server with the in-memory gateway.
//!
//! ```text
//! SIXGUN_BIND=0.0.0.0:8080 RUST_LOG=sixgun=debug cargo run -p saloon
//! ```
//!
//! Any numeric token is accepted as the player id, so this is for local
//! play and client development only.

use sixgun::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

struct NumericTokenAuth;

impl Authenticator for NumericTokenAuth {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, AuthError> {
        let id: u64 = token
            .parse()
            .map_err(|_| AuthError::Rejected("token must be a number".into()))?;
        Ok(PlayerId(id))
    }
}

/// Engine settings from the environment. `SIXGUN_SEED` makes every game
/// replayable.
fn engine_config() -> EngineConfig {
    let seed = std::env::var("SIXGUN_SEED")
        .ok()
        .and_then(|s| s.parse().ok());
    EngineConfig {
        seed,
        ..EngineConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("SIXGUN_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let server = SixgunServerBuilder::new()
        .bind(&bind)
        .engine_config(engine_config())
        .build(InMemoryGateway::default(), NumericTokenAuth)
        .await?;

    tracing::info!(addr = %server.local_addr()?, "saloon is open");
    server.run().await?;
    Ok(())
}
