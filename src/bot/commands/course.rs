//! Course Discord commands - the `/course` command group.
//!
//! Courses carry the price that new enrollments are charged. Changing the
//! price later never touches existing enrollments.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, lookup, owner_of},
        core::{course, input, report::format_money},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for managing your course catalog.
    #[poise::command(
        slash_command,
        subcommands("course_add", "course_list", "course_update", "course_delete")
    )]
    pub async fn course(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Course management command. Available subcommands:\n\
            `/course add` - Add a new course\n\
            `/course list` - List your courses\n\
            `/course update` - Change a course's cost, code or schedule\n\
            `/course delete` - Delete a course with no enrollments";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a course to your catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn course_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course name (e.g., 'Algebra I')"] name: String,
        #[description = "Price charged per enrollment (e.g., 250.00)"] cost: String,
        #[description = "Optional course code"] code: Option<String>,
        #[description = "Optional schedule (e.g., 'Mon/Wed 16:00')"] schedule: Option<String>,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let cost = input::parse_amount(&cost)?;

        let created = course::create_course(db, &owner, name, code, cost, schedule).await?;
        ctx.say(&format!(
            "✅ Added course **{}** at {} per enrollment.",
            created.name,
            format_money(created.cost)
        ))
        .await?;
        Ok(())
    }

    /// Lists your courses.
    #[poise::command(slash_command, rename = "list")]
    pub async fn course_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let owner = owner_of(ctx)?;
        let courses = course::get_all_courses(&ctx.data().database, &owner).await?;

        if courses.is_empty() {
            ctx.say("📚 No courses yet. Add one with `/course add`.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📚 **Your Courses**\n\n");
        for c in courses {
            write!(&mut response, "• **{}** - {}", c.name, format_money(c.cost))?;
            if let Some(code) = &c.course_code {
                write!(&mut response, " [{code}]")?;
            }
            if let Some(schedule) = &c.schedule {
                write!(&mut response, " ({schedule})")?;
            }
            writeln!(&mut response)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Changes a course's cost, code or schedule.
    #[poise::command(slash_command, rename = "update")]
    pub async fn course_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course to update"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        name: String,
        #[description = "New price for future enrollments"] cost: Option<String>,
        #[description = "New course code"] code: Option<String>,
        #[description = "New schedule"] schedule: Option<String>,
    ) -> Result<()> {
        if cost.is_none() && code.is_none() && schedule.is_none() {
            ctx.say("❌ Please specify at least one field to update (cost, code, or schedule).")
                .await?;
            return Ok(());
        }

        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let cost = cost.as_deref().map(input::parse_amount).transpose()?;
        let existing = lookup::find_course(db, &owner, &name).await?;

        let updated = course::update_course(db, &owner, existing.id, cost, code, schedule).await?;
        ctx.say(&format!(
            "✅ Updated **{}**: {} per enrollment. Existing enrollments keep their original charge.",
            updated.name,
            format_money(updated.cost)
        ))
        .await?;
        Ok(())
    }

    /// Deletes a course that has no enrollments.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn course_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course to delete"]
        #[autocomplete = "autocomplete::autocomplete_course_name"]
        name: String,
    ) -> Result<()> {
        let owner = owner_of(ctx)?;
        let db = &ctx.data().database;
        let existing = lookup::find_course(db, &owner, &name).await?;

        course::delete_course(db, &owner, existing.id).await?;
        ctx.say(&format!("✅ Deleted course **{}**.", existing.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
