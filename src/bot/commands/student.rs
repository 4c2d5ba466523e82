//! Student Discord commands - the `/student` command group.
//!
//! New students are checked by the validation sidecar before they are saved.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{
            course,
            report::{self, format_attendance, format_average, format_money},
            student::{self, NewStudent},
        },
        entities::StudentStatus,
        errors::{Error, Result},
        sidecar::StudentRecord,
    };
    use std::{collections::HashMap, fmt::Write};
    use tracing::info;

    /// Parent command for managing your students.
    #[poise::command(
        slash_command,
        subcommands(
            "student_add",
            "student_list",
            "student_info",
            "student_status",
            "student_delete"
        )
    )]
    pub async fn student(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Student management command. Available subcommands:\n\
            `/student add` - Add a student\n\
            `/student list` - List your students\n\
            `/student info` - Balance, courses, payments and attendance of one student\n\
            `/student status` - Change a student's status\n\
            `/student delete` - Remove a student and all of their records";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a student after checking them with the validation service.
    #[poise::command(slash_command, rename = "add")]
    pub async fn student_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First name"] first_name: String,
        #[description = "Last name"] last_name: String,
        #[description = "Optional student code"] code: Option<String>,
        #[description = "Optional email"] email: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let data = ctx.data();

        let new_student = NewStudent {
            student_code: code,
            email: email.filter(|e| !e.trim().is_empty()),
            ..NewStudent::named(&first_name, &last_name)
        };

        let verdict = data
            .sidecar
            .check_student(&owner, StudentRecord::from(&new_student))?;
        if !verdict.validation_ok {
            info!(owner = %owner, "Validation service rejected a new student");
            ctx.say(&format!(
                "❌ {}",
                verdict.error.as_deref().unwrap_or("Student data was rejected.")
            ))
            .await?;
            return Ok(());
        }

        let created = student::create_student(&data.database, &owner, new_student).await?;
        ctx.say(&format!(
            "✅ Added **{}** to your roster as {}.",
            created.full_name(),
            lookup::student_label(&created)
        ))
        .await?;
        Ok(())
    }

    /// Lists your students.
    #[poise::command(slash_command, rename = "list")]
    pub async fn student_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let owner = owner_of(ctx)?;
        let students = student::get_all_students(&ctx.data().database, &owner).await?;

        if students.is_empty() {
            ctx.say("🎓 No students yet. Add one with `/student add`.")
                .await?;
            return Ok(());
        }

        let mut response = format!("🎓 **Your Students** ({})\n\n", students.len());
        for s in &students {
            write!(&mut response, "• {} - {}", lookup::student_label(s), s.status)?;
            if let Some(code) = &s.student_code {
                write!(&mut response, " [{code}]")?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows balance, courses, recent payments and attendance for one student.
    #[poise::command(slash_command, rename = "info")]
    pub async fn student_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let data = ctx.data();
        let db = &data.database;
        let found = lookup::find_student(db, &owner, &student).await?;
        let student_report = report::generate_student_report(
            db,
            &owner,
            found.id,
            data.config.reports.recent_payments,
        )
        .await?;

        let mut response = format!("📋 **{}**\n\n", lookup::student_label(&found));
        writeln!(&mut response, "📌 Status: {}", found.status)?;
        if let Some(email) = &found.email {
            writeln!(&mut response, "✉️ Email: {email}")?;
        }
        writeln!(
            &mut response,
            "💰 Balance: {}",
            format_money(student_report.balance)
        )?;
        writeln!(
            &mut response,
            "{} Risk: {} ({})",
            student_report.risk.level.emoji(),
            student_report.risk.level,
            student_report.risk.score
        )?;
        writeln!(
            &mut response,
            "🗓️ Attendance: {}\n",
            format_attendance(&student_report.attendance)
        )?;

        if student_report.enrollments.is_empty() {
            response.push_str("_Not enrolled in any course_\n");
        } else {
            let course_names: HashMap<i64, String> = course::get_all_courses(db, &owner)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect();

            response.push_str("**Enrollments:**\n");
            for e in &student_report.enrollments {
                let state = if e.is_active { "active" } else { "closed" };
                writeln!(
                    &mut response,
                    "• {} since {} ({state}) - {} - {}",
                    course_names
                        .get(&e.course_id)
                        .map_or("Unknown course", String::as_str),
                    e.start_date,
                    format_money(e.charge),
                    format_average(e.average)
                )?;
            }
        }

        if student_report.recent_payments.is_empty() {
            response.push_str("\n_No payments recorded_\n");
        } else {
            response.push_str("\n**Recent Payments:**\n");
            for p in &student_report.recent_payments {
                writeln!(&mut response, "• {}", report::format_payment_summary(p))?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Changes a student's status.
    #[poise::command(slash_command, rename = "status")]
    pub async fn student_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_student_status"]
        status: String,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let status: StudentStatus = status
            .parse()
            .map_err(|message| Error::Validation { message })?;
        let found = lookup::find_student(db, &owner, &student).await?;

        let updated = student::set_student_status(db, &owner, found.id, status).await?;
        ctx.say(&format!(
            "✅ **{}** is now {}.",
            updated.full_name(),
            updated.status
        ))
        .await?;
        Ok(())
    }

    /// Removes a student and every record attached to them.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn student_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let found = lookup::find_student(db, &owner, &student).await?;

        student::delete_student(db, &owner, found.id).await?;
        ctx.say(&format!(
            "✅ Removed **{}** with their enrollments, grades, payments and attendance.",
            found.full_name()
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
