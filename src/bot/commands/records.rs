//! Attendance and grading Discord commands - `attend` and `grade`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{attendance, enrollment, grades, input, report::format_average},
        entities::AttendanceStatus,
        errors::{Error, Result},
    };

    /// Marks a student's attendance for one session. Marking again replaces the mark.
    #[poise::command(slash_command, prefix_command)]
    pub async fn attend(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        course: String,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Present, Absent, Late or Excused"]
        #[autocomplete = "autocomplete::autocomplete_attendance_status"]
        status: String,
        #[description = "Session date (YYYY-MM-DD, default today)"] date: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let status: AttendanceStatus = status
            .parse()
            .map_err(|message| Error::Validation { message })?;
        let date = input::parse_date_or(date.as_deref(), input::today())?;
        let found_course = lookup::find_course(db, &owner, &course).await?;
        let found_student = lookup::find_student(db, &owner, &student).await?;

        attendance::mark_attendance(db, &owner, found_course.id, found_student.id, date, status)
            .await?;
        let summary =
            attendance::get_attendance_summary(db, &owner, found_student.id, Some(found_course.id))
                .await?;

        ctx.say(&format!(
            "✅ Marked **{}** {} in **{}** on {date}. Present rate: {:.0}% of {} session{}.",
            found_student.full_name(),
            status.to_string().to_lowercase(),
            found_course.name,
            summary.present_rate() * 100.0,
            summary.total(),
            if summary.total() == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Records an assessment score and updates the student's course average.
    #[poise::command(slash_command, prefix_command)]
    pub async fn grade(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        course: String,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "What was assessed (e.g., 'Midterm')"] description: String,
        #[description = "Points obtained"] score: String,
        #[description = "Points possible"] max_score: String,
        #[description = "Assessment date (YYYY-MM-DD, default today)"] date: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let score = input::parse_amount(&score)?;
        let max_score = input::parse_amount(&max_score)?;
        let date = input::parse_date_or(date.as_deref(), input::today())?;
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

        let recorded =
            grades::record_score(db, &owner, active.id, description, score, max_score, date)
                .await?;
        ctx.say(&format!(
            "✅ Recorded {score}/{max_score} for **{}** in **{}**. Course average: {}.",
            found_student.full_name(),
            found_course.name,
            format_average(recorded.enrollment.average)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
