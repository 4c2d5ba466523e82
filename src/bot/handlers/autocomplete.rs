//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions only ever come from the invoking operator's own records.

use crate::{
    bot::{BotData, lookup},
    core::{OwnerId, course, student},
    entities::{AttendanceStatus, StudentStatus},
    errors::Error,
};
use sea_orm::Iterable;

/// Discord shows at most this many suggestions.
const AUTOCOMPLETE_LIMIT: usize = 25;

fn matching<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&partial_lower))
        .take(AUTOCOMPLETE_LIMIT)
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

/// Suggests the operator's course names.
pub async fn autocomplete_course_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(owner) = OwnerId::new(ctx.author().id.to_string()) else {
        return Vec::new();
    };
    let Ok(courses) = course::get_all_courses(&ctx.data().database, &owner).await else {
        return Vec::new();
    };

    matching(courses.into_iter().map(|c| c.name), partial)
}

/// Suggests the operator's students as `Last, First (#id)` labels.
pub async fn autocomplete_student(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(owner) = OwnerId::new(ctx.author().id.to_string()) else {
        return Vec::new();
    };
    let Ok(students) = student::get_all_students(&ctx.data().database, &owner).await else {
        return Vec::new();
    };

    matching(students.iter().map(lookup::student_label), partial)
}

/// Suggests attendance statuses.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_attendance_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(AttendanceStatus::iter().map(|s| s.to_string()), partial)
}

/// Suggests student statuses.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_student_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(StudentStatus::iter().map(|s| s.to_string()), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive_and_sorted() {
        let names = ["Violin", "Algebra", "viola da gamba", "Biology"].map(String::from);
        assert_eq!(matching(names, "VIOL"), ["Violin", "viola da gamba"]);
    }

    #[test]
    fn test_matching_respects_limit() {
        let names = (0..40).map(|i| format!("Course {i:02}"));
        assert_eq!(matching(names, "course").len(), AUTOCOMPLETE_LIMIT);
    }

    #[test]
    fn test_status_labels_parse_back() {
        for label in matching(AttendanceStatus::iter().map(|s| s.to_string()), "") {
            assert!(label.parse::<AttendanceStatus>().is_ok(), "{label}");
        }
        for label in matching(StudentStatus::iter().map(|s| s.to_string()), "") {
            assert!(label.parse::<StudentStatus>().is_ok(), "{label}");
        }
    }
}
