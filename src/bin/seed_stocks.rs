use anyhow::Context;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use papertrade_backend::config::Config;
use papertrade_backend::services::maintenance::{seed_stocks, NEPSE_LISTINGS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,papertrade_backend=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    migration::Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Populating NEPSE stocks...");
    let report = seed_stocks(&db, NEPSE_LISTINGS, &mut rand::thread_rng()).await?;

    tracing::info!(
        created = report.created,
        updated = report.updated,
        "Done! Added/Updated {} stocks.",
        NEPSE_LISTINGS.len()
    );
    Ok(())
}
