//! # FeedbackHub API Main Entry Point

use feedbackhub::{config::ConfigLoader, db::init_pool, server::run_server, telemetry};
use migration::MigratorTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;
    migration::Migrator::up(&db, None).await?;

    run_server(config, db).await
}
