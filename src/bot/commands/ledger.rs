//! Payment Discord commands - `pay`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{input, ledger, payment, report::format_money},
        errors::{Error, Result},
    };

    /// Records a payment from a student. Use a negative amount for a refund.
    #[poise::command(slash_command, prefix_command)]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student who paid"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Amount (e.g., 125.50, or -20 for a refund)"] amount: String,
        #[description = "Payment date (YYYY-MM-DD, default today)"] date: Option<String>,
        #[description = "Optional note (e.g., 'cash', 'March tuition')"] notes: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let amount = input::parse_amount(&amount)?;
        let date = input::parse_date_or(date.as_deref(), input::today())?;
        let found = lookup::find_student(db, &owner, &student).await?;

        payment::record_payment(db, &owner, found.id, amount, date, notes).await?;
        let balance = ledger::get_student_balance(db, &owner, found.id).await?;

        let verb = if amount.is_sign_negative() {
            "Refunded"
        } else {
            "Received"
        };
        ctx.say(&format!(
            "✅ {verb} {} for **{}** on {date}. Balance is now {}.",
            format_money(amount.abs()),
            found.full_name(),
            format_money(balance)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
