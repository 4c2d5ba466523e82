//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Classbook Help**\n\
        Every record you create is private to you.\n\n\
        **Roster**\n\
        • `/course <add|list|update|delete>` - Manage your course catalog.\n\
        • `/student <add|list|info|status|delete>` - Manage your students.\n\
        • `/enroll <course> <students>` - Enroll students (comma separated) in a course.\n\
        • `/unenroll <course> <student> [end_date]` - Close an enrollment.\n\n\
        **Records**\n\
        • `/pay <student> <amount> [date] [notes]` - Record a payment (negative for refunds).\n\
        • `/attend <course> <student> <status> [date]` - Mark attendance for a session.\n\
        • `/grade <course> <student> <description> <score> <max_score> [date]` - Record a score.\n\n\
        **Analytics**\n\
        • `/analytics` - Revenue, fees owed, and next month's revenue forecast.\n\
        • `/risk` - Dropout risk for every student.\n\
        • `/predict <course> <student>` - Predict a grade from your other graded enrollments.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.\n\n\
        Dates use the `YYYY-MM-DD` format and default to today.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
