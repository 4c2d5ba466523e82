//! Resolving what an operator typed into the records it names.
//!
//! Autocomplete offers students as `Last, First (#id)`. Commands accept that
//! label, `#12`, a student code, a bare id, or the full name. A bare number is
//! tried as a student code before it is tried as an id.

use crate::{
    core::{OwnerId, course, student},
    entities::{course as course_entity, student as student_entity},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Label used for a student in autocomplete and replies.
#[must_use]
pub fn student_label(student: &student_entity::Model) -> String {
    format!("{}, {} (#{})", student.last_name, student.first_name, student.id)
}

/// Extracts a student id from the explicit `#12` or `... (#12)` forms.
///
/// Bare digits are not an id here: they may be a student code.
#[must_use]
pub fn parse_student_id(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    trimmed
        .strip_suffix(')')
        .and_then(|rest| rest.rsplit_once("(#"))
        .map(|(_, id)| id)
        .or_else(|| trimmed.strip_prefix('#'))
        .and_then(|id| id.trim().parse().ok())
}

/// Finds a student of the owner by any of the accepted forms.
pub async fn find_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    input: &str,
) -> Result<student_entity::Model> {
    if let Some(id) = parse_student_id(input) {
        return student::require_student(db, owner, id).await;
    }

    if let Some(found) = student::get_student_by_code(db, owner, input).await? {
        return Ok(found);
    }

    if let Ok(id) = input.trim().parse::<i64>() {
        return student::require_student(db, owner, id).await;
    }

    let wanted = input.trim().to_lowercase();
    let mut matches: Vec<student_entity::Model> = student::get_all_students(db, owner)
        .await?
        .into_iter()
        .filter(|s| s.full_name().to_lowercase() == wanted)
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(Error::Validation {
            message: format!("No student matches '{}'", input.trim()),
        }),
        n => Err(Error::Validation {
            message: format!("{n} students are named '{}'; pick one by id", input.trim()),
        }),
    }
}

/// Finds a course of the owner by name.
pub async fn find_course(
    db: &DatabaseConnection,
    owner: &OwnerId,
    name: &str,
) -> Result<course_entity::Model> {
    course::get_course_by_name(db, owner, name)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            id: name.trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::student::NewStudent, test_utils::*};

    #[test]
    fn test_parse_student_id() {
        assert_eq!(parse_student_id("12"), None);
        assert_eq!(parse_student_id(" #7 "), Some(7));
        assert_eq!(parse_student_id("Lovelace, Ada (#42)"), Some(42));
        assert_eq!(parse_student_id("Ada Lovelace"), None);
        assert_eq!(parse_student_id("S-001"), None);
    }

    #[tokio::test]
    async fn test_find_student_forms() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let ada = create_test_student(&db, &owner, "Ada", "Lovelace").await?;

        assert_eq!(find_student(&db, &owner, &student_label(&ada)).await?.id, ada.id);
        assert_eq!(find_student(&db, &owner, &ada.id.to_string()).await?.id, ada.id);
        assert_eq!(find_student(&db, &owner, "ada lovelace").await?.id, ada.id);

        create_test_student(&db, &owner, "Ada", "Lovelace").await?;
        assert!(matches!(
            find_student(&db, &owner, "Ada Lovelace").await,
            Err(Error::Validation { .. })
        ));

        assert!(matches!(
            find_student(&db, &other_owner(), &ada.id.to_string()).await,
            Err(Error::StudentNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_numeric_code_wins_over_matching_id() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let ada = create_test_student(&db, &owner, "Ada", "Lovelace").await?;
        create_test_student(&db, &owner, "Alan", "Turing").await?;
        let grace = student::create_student(
            &db,
            &owner,
            NewStudent {
                student_code: Some(ada.id.to_string()),
                ..NewStudent::named("Grace", "Hopper")
            },
        )
        .await?;

        assert_eq!(find_student(&db, &owner, &ada.id.to_string()).await?.id, grace.id);
        assert_eq!(find_student(&db, &owner, &format!("#{}", ada.id)).await?.id, ada.id);
        assert_eq!(find_student(&db, &owner, &student_label(&ada)).await?.id, ada.id);

        let coded = student::create_student(
            &db,
            &owner,
            NewStudent {
                student_code: Some("2024001".to_string()),
                ..NewStudent::named("Katherine", "Johnson")
            },
        )
        .await?;
        assert_eq!(find_student(&db, &owner, "2024001").await?.id, coded.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_course() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let course = create_test_course(&db, &owner, "Geometry").await?;

        assert_eq!(find_course(&db, &owner, " Geometry ").await?.id, course.id);
        assert!(matches!(
            find_course(&db, &other_owner(), "Geometry").await,
            Err(Error::CourseNotFound { .. })
        ));

        Ok(())
    }
}
