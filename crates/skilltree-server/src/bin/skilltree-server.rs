//! Skill tree editor server binary.

use skilltree_server::{ServerConfig, SkillTreeServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skilltree_server=info,skilltree_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.addr,
        state = %config.state_path.display(),
        "Starting skill tree server"
    );

    let server = SkillTreeServer::load(config)?;
    server.serve().await?;

    Ok(())
}
