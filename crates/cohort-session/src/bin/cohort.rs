//! Cohort Session Server
//!
//! Host a grouping session and serve its API.
//!
//! Usage: `cohort [config.toml]`

use std::env;
use std::path::PathBuf;

use cohort_session::{Clock, CohortServer, Session, SessionConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cohort=info,cohort_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = SessionConfig::load(config_path.as_deref())?;

    tracing::info!(
        data = %config.data_path.display(),
        device = ?config.device,
        port = config.port,
        "Starting Cohort"
    );

    let port = config.port;
    let clock = Clock::new(config.tick_interval());
    let session = Session::open(config)?.shared();

    clock.spawn(session.clone());
    CohortServer::new(session.clone()).serve(port).await?;

    // Keep what was done since the last autosave
    session.read().await.save()?;
    Ok(())
}
