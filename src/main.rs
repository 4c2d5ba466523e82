#![allow(clippy::result_large_err)]

use classbook::{
    bot::{self, BotData},
    config::{app, database},
    errors::{Error, Result},
    sidecar::Sidecar,
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars may also be set externally
    dotenv().ok();

    // 3. Load settings and the sidecar secret
    let app_config = app::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    let secret = app::load_shared_secret()
        .inspect_err(|e| error!("Sidecar is not configured: {}", e))?;
    let sidecar = Sidecar::new(secret, app_config.sidecar.clone())?;
    info!("Configuration loaded.");

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, Arc::new(app_config), sidecar)).await
}
