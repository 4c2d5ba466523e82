//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for Classbook, including all
//! slash commands, autocomplete handlers, and bot context management. The
//! Discord user invoking a command is the owner of every record it touches.

/// Discord command implementations
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Resolving typed names and ids into records
pub mod lookup;

use crate::{
    config::app::AppConfig,
    core::OwnerId,
    errors::{Error, Result},
    sidecar::Sidecar,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded at startup
    pub config: Arc<AppConfig>,
    /// Validation sidecar for new students
    pub sidecar: Sidecar,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, config: Arc<AppConfig>, sidecar: Sidecar) -> Self {
        Self {
            database,
            config,
            sidecar,
        }
    }
}

/// The owner all records of this invocation belong to.
pub fn owner_of(ctx: poise::Context<'_, BotData, Error>) -> Result<OwnerId> {
    OwnerId::new(ctx.author().id.to_string())
}

/// Operator-facing text for errors caused by input rather than by the system.
#[must_use]
pub fn user_facing_message(error: &Error) -> Option<String> {
    match error {
        Error::Validation { message } => Some(message.clone()),
        Error::InvalidAmount { amount } => Some(format!("{amount} is not an allowed amount")),
        Error::StudentNotFound { id } => Some(format!("Student #{id} not found")),
        Error::CourseNotFound { id } => Some(format!("Course '{id}' not found")),
        Error::EnrollmentNotFound { id } => Some(format!("Enrollment #{id} not found")),
        Error::Prediction(e) => Some(e.to_string()),
        Error::Token(e) => Some(format!("Validation service refused the request: {e}")),
        Error::Config { .. }
        | Error::Database(_)
        | Error::EnvVar(_)
        | Error::Fmt(_)
        | Error::TryFromInt(_)
        | Error::Framework(_) => None,
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let reply = if let Some(message) = user_facing_message(&error) {
                warn!("Rejected `{}`: {}", ctx.command().name, error);
                format!("❌ {message}")
            } else {
                error!("Error in command `{}`: {:?}", ctx.command().name, error);
                "❌ Something went wrong. Please try again later.".to_string()
            };
            if let Err(e) = ctx.say(reply).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
