//! Enrollment Discord commands - `enroll` and `unenroll`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{enrollment, input, report::format_money},
        errors::{Error, Result},
    };

    /// Enrolls one or more students in a course at its current price.
    ///
    /// Students already active in the course are skipped.
    #[poise::command(slash_command, prefix_command)]
    pub async fn enroll(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course to enroll in"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        course: String,
        #[description = "Students, comma separated (names, codes or #ids)"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        students: String,
        #[description = "Start date (YYYY-MM-DD, default today)"] start_date: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let start_date = input::parse_date_or(start_date.as_deref(), input::today())?;
        let found_course = lookup::find_course(db, &owner, &course).await?;

        let mut student_ids = Vec::new();
        for reference in students.split(',').filter(|s| !s.trim().is_empty()) {
            student_ids.push(lookup::find_student(db, &owner, reference).await?.id);
        }
        if student_ids.is_empty() {
            ctx.say("❌ Name at least one student to enroll.").await?;
            return Ok(());
        }

        let created =
            enrollment::enroll_students_on(db, &owner, found_course.id, &student_ids, start_date)
                .await?;
        let skipped = student_ids.len() - created.len().min(student_ids.len());

        let mut response = format!(
            "✅ Enrolled {} student{} in **{}** at {} each.",
            created.len(),
            if created.len() == 1 { "" } else { "s" },
            found_course.name,
            format_money(found_course.cost)
        );
        if skipped > 0 {
            response.push_str(&format!(" {skipped} already enrolled or listed twice."));
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Closes a student's active enrollment in a course.
    ///
    /// The charge stays on the student's balance.
    #[poise::command(slash_command, prefix_command)]
    pub async fn unenroll(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        course: String,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "End date (YYYY-MM-DD, default today)"] end_date: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let end_date = input::parse_date_or(end_date.as_deref(), input::today())?;
        let found_course = lookup::find_course(db, &owner, &course).await?;
        let found_student = lookup::find_student(db, &owner, &student).await?;

        let Some(active) =
            enrollment::get_active_enrollment(db, &owner, found_student.id, found_course.id).await?
        else {
            ctx.say(&format!(
                "❌ {} is not actively enrolled in {}.",
                found_student.full_name(),
                found_course.name
            ))
            .await?;
            return Ok(());
        };

        enrollment::close_enrollment(db, &owner, active.id, end_date).await?;
        ctx.say(&format!(
            "✅ Closed **{}**'s enrollment in **{}** as of {end_date}.",
            found_student.full_name(),
            found_course.name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
