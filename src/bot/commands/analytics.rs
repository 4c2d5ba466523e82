//! Analytics Discord commands - `analytics`, `risk` and `predict`.
//!
//! Everything here is read-only and derived from the owner's records.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{
            enrollment, forecast, ledger, predictor,
            report::{format_money, format_progress_bar},
            risk,
        },
        errors::{Error, Result},
    };
    use rust_decimal::{Decimal, prelude::ToPrimitive};
    use std::fmt::Write;

    /// Months of revenue history listed under the forecast.
    const SHOWN_MONTHS: usize = 6;

    /// Shows revenue, fees owed and next month's revenue forecast.
    #[poise::command(slash_command, prefix_command)]
    pub async fn analytics(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let owner = owner_of(ctx)?;
        let data = ctx.data();
        let db = &data.database;

        let summary = ledger::get_ledger_summary(db, &owner).await?;
        let projection =
            forecast::forecast_revenue(db, &owner, data.config.reports.forecast_window_months)
                .await?;
        let totals = summary.totals;

        let mut response = String::from("📊 **Dashboard**\n\n");
        writeln!(
            &mut response,
            "🎓 {} students, 📚 {} courses",
            summary.student_count, summary.course_count
        )?;
        writeln!(
            &mut response,
            "💵 Revenue: {}",
            format_money(totals.total_revenue)
        )?;
        writeln!(
            &mut response,
            "🧾 Charges: {}",
            format_money(totals.total_charges)
        )?;
        writeln!(
            &mut response,
            "⚖️ Owed overall: {}",
            format_money(totals.total_owed)
        )?;
        writeln!(
            &mut response,
            "⏳ Outstanding fees: {}",
            format_money(totals.outstanding_fees)
        )?;

        if !totals.total_charges.is_zero() {
            let collected = (totals.total_revenue * Decimal::ONE_HUNDRED / totals.total_charges)
                .to_f64()
                .unwrap_or_default();
            writeln!(
                &mut response,
                "Collected: {}",
                format_progress_bar(collected, None)
            )?;
        }

        response.push_str("\n📈 **Revenue Forecast**\n");
        if projection.series.is_empty() {
            response.push_str("_No payments recorded yet_\n");
        } else {
            let shown = forecast::trailing(&projection.series, SHOWN_MONTHS);
            for point in shown {
                writeln!(&mut response, "• {point}: {}", format_money(point.total))?;
            }
            let next = Decimal::from_f64_retain(projection.next_month)
                .unwrap_or_default()
                .round_dp(2);
            writeln!(&mut response, "➡️ Next month: ~{}", format_money(next))?;
            if let Some(trend) = projection.trend {
                let direction = if trend.slope >= 0.0 { "📈" } else { "📉" };
                writeln!(
                    &mut response,
                    "{direction} Trend: {:+.2} per month over {} month{}",
                    trend.slope,
                    projection.series.len(),
                    if projection.series.len() == 1 { "" } else { "s" }
                )?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Lists every student by financial and engagement risk, highest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn risk(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let owner = owner_of(ctx)?;
        let assessed = risk::assess_all_students(&ctx.data().database, &owner).await?;

        if assessed.is_empty() {
            ctx.say("🎓 No students to assess yet.").await?;
            return Ok(());
        }

        let mut response = String::from("🚦 **Student Risk**\n\n");
        for r in &assessed {
            writeln!(
                &mut response,
                "{} {} - {} ({}) - balance {}, {} active course{}",
                r.assessment.level.emoji(),
                lookup::student_label(&r.student),
                r.assessment.level,
                r.assessment.score,
                format_money(r.balance),
                r.course_count,
                if r.course_count == 1 { "" } else { "s" }
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Predicts a student's grade in a course from the rest of your graded enrollments.
    #[poise::command(slash_command, prefix_command)]
    pub async fn predict(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        course: String,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let found_course = lookup::find_course(db, &owner, &course).await?;
        let found_student = lookup::find_student(db, &owner, &student).await?;

        // Prefer the active enrollment, otherwise the most recent closed one
        let target = match enrollment::get_active_enrollment(
            db,
            &owner,
            found_student.id,
            found_course.id,
        )
        .await?
        {
            Some(active) => Some(active),
            None => enrollment::get_enrollments_for_student(db, &owner, found_student.id)
                .await?
                .into_iter()
                .find(|e| e.course_id == found_course.id),
        };
        let Some(target) = target else {
            ctx.say(&format!(
                "❌ {} has never been enrolled in {}.",
                found_student.full_name(),
                found_course.name
            ))
            .await?;
            return Ok(());
        };

        let prediction = predictor::predict_enrollment(db, &owner, target.id).await?;

        let mut response = format!(
            "🔮 Predicted grade for **{}** in **{}**: {}\n",
            found_student.full_name(),
            found_course.name,
            format_progress_bar(prediction.predicted, None)
        );
        for (name, value) in predictor::OBSERVED_FEATURES
            .iter()
            .zip(&prediction.features)
        {
            writeln!(&mut response, "• {name}: {value:.2}")?;
        }
        writeln!(
            &mut response,
            "_Fitted on {} graded enrollment{}_",
            prediction.sample_count,
            if prediction.sample_count == 1 { "" } else { "s" }
        )?;

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
