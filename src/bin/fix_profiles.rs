use anyhow::Context;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use papertrade_backend::config::Config;
use papertrade_backend::services::maintenance::repair_profiles;

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

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let created = repair_profiles(&db, config.starting_balance).await?;
    tracing::info!("Created {} missing profiles", created);
    Ok(())
}
