//! Student business logic - Roster management for one owner.
//!
//! Creating, listing, updating and removing students. Removing a student also
//! removes every record that hangs off it (enrollments, scores, payments and
//! attendance) inside a single transaction.

use crate::{
    core::tenant::OwnerId,
    entities::{
        AssessmentScore, Attendance, Enrollment, Payment, Student, StudentStatus,
        assessment_score, attendance, enrollment, payment, student,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// Input for a new roster entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewStudent {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Optional school-issued code
    pub student_code: Option<String>,
    /// Optional contact email
    pub email: Option<String>,
    /// Initial status
    pub status: StudentStatus,
}

impl NewStudent {
    /// An active student with only a name.
    #[must_use]
    pub fn named(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            student_code: None,
            email: None,
            status: StudentStatus::Active,
        }
    }
}

/// Retrieves the owner's students ordered by last name, then first name.
pub async fn get_all_students(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<student::Model>> {
    Student::find()
        .filter(student::Column::OwnerId.eq(owner.as_str()))
        .order_by_asc(student::Column::LastName)
        .order_by_asc(student::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by id within the owner's roster.
pub async fn get_student_by_id<C>(
    db: &C,
    owner: &OwnerId,
    student_id: i64,
) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find_by_id(student_id)
        .filter(student::Column::OwnerId.eq(owner.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_student_by_id`] but a missing student is an error.
pub async fn require_student<C>(db: &C, owner: &OwnerId, student_id: i64) -> Result<student::Model>
where
    C: ConnectionTrait,
{
    get_student_by_id(db, owner, student_id)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })
}

/// Finds a student by their school-issued code.
pub async fn get_student_by_code(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_code: &str,
) -> Result<Option<student::Model>> {
    Student::find()
        .filter(student::Column::OwnerId.eq(owner.as_str()))
        .filter(student::Column::StudentCode.eq(student_code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds a student to the owner's roster.
///
/// Names are trimmed and must not be empty. A student code, when given, must be
/// unique within the owner's roster.
pub async fn create_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    new_student: NewStudent,
) -> Result<student::Model> {
    let first_name = new_student.first_name.trim().to_string();
    let last_name = new_student.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::Validation {
            message: "Student first and last name are required".to_string(),
        });
    }

    let student_code = new_student
        .student_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty());

    if let Some(code) = &student_code {
        if get_student_by_code(db, owner, code).await?.is_some() {
            return Err(Error::Validation {
                message: format!("Student code '{code}' is already in use"),
            });
        }
    }

    let student = student::ActiveModel {
        owner_id: Set(owner.as_str().to_string()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        student_code: Set(student_code),
        email: Set(new_student.email),
        status: Set(new_student.status),
        date_added: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = student.insert(db).await?;
    info!(owner = %owner, student_id = result.id, "Added student {}", result.full_name());
    Ok(result)
}

/// Changes a student's status.
pub async fn set_student_status(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    status: StudentStatus,
) -> Result<student::Model> {
    let existing = require_student(db, owner, student_id).await?;
    let mut active: student::ActiveModel = existing.into();
    active.status = Set(status);
    active.update(db).await.map_err(Into::into)
}

/// Removes a student together with all of their records.
pub async fn delete_student(db: &DatabaseConnection, owner: &OwnerId, student_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = require_student(&txn, owner, student_id).await?;

    let enrollment_ids: Vec<i64> = Enrollment::find()
        .select_only()
        .column(enrollment::Column::Id)
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .into_tuple()
        .all(&txn)
        .await?;

    AssessmentScore::delete_many()
        .filter(assessment_score::Column::OwnerId.eq(owner.as_str()))
        .filter(assessment_score::Column::EnrollmentId.is_in(enrollment_ids))
        .exec(&txn)
        .await?;
    Enrollment::delete_many()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;
    Payment::delete_many()
        .filter(payment::Column::OwnerId.eq(owner.as_str()))
        .filter(payment::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;
    Attendance::delete_many()
        .filter(attendance::Column::OwnerId.eq(owner.as_str()))
        .filter(attendance::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(owner = %owner, student_id, "Deleted student and their records");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_student_requires_names() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let owner = test_owner();

        let result = create_student(&db, &owner, NewStudent::named("", "Smith")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = create_student(&db, &owner, NewStudent::named("Jo", "   ")).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_student_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();

        let student = create_student(
            &db,
            &owner,
            NewStudent {
                first_name: " Grace ".to_string(),
                last_name: "Hopper".to_string(),
                student_code: Some("S-001".to_string()),
                email: Some("grace@example.com".to_string()),
                status: StudentStatus::Active,
            },
        )
        .await?;

        assert_eq!(student.first_name, "Grace");
        assert_eq!(student.full_name(), "Grace Hopper");
        assert_eq!(student.student_code.as_deref(), Some("S-001"));
        assert_eq!(student.status, StudentStatus::Active);
        assert_eq!(student.owner_id, owner.as_str());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_student_code_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();

        let mut first = NewStudent::named("Alan", "Turing");
        first.student_code = Some("T-1".to_string());
        create_student(&db, &owner, first.clone()).await?;

        let result = create_student(&db, &owner, first.clone()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Another owner may reuse the code
        create_student(&db, &other_owner(), first).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_students_sorted_and_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();

        create_test_student(&db, &owner, "Zed", "Young").await?;
        create_test_student(&db, &owner, "Amy", "Adams").await?;
        create_test_student(&db, &other_owner(), "Bob", "Brown").await?;

        let students = get_all_students(&db, &owner).await?;
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].last_name, "Adams");
        assert_eq!(students[1].last_name, "Young");

        let foreign = get_all_students(&db, &other_owner()).await?;
        assert!(get_student_by_id(&db, &owner, foreign[0].id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_student_status() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let student = create_test_student(&db, &owner, "Linus", "Pauling").await?;

        let updated = set_student_status(&db, &owner, student.id, StudentStatus::OnLeave).await?;
        assert_eq!(updated.status, StudentStatus::OnLeave);

        let result = set_student_status(&db, &other_owner(), student.id, StudentStatus::Dropped).await;
        assert!(matches!(result.unwrap_err(), Error::StudentNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_student_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let (student, enrollment) = setup_enrolled_student(&db, &owner).await?;

        create_test_payment(&db, &owner, student.id, dec!(50)).await?;
        crate::core::grades::record_score(
            &db,
            &owner,
            enrollment.id,
            "Quiz".to_string(),
            dec!(8),
            dec!(10),
            test_date(1),
        )
        .await?;
        crate::core::attendance::mark_attendance(
            &db,
            &owner,
            enrollment.course_id,
            student.id,
            test_date(1),
            crate::entities::AttendanceStatus::Present,
        )
        .await?;

        delete_student(&db, &owner, student.id).await?;

        assert!(get_student_by_id(&db, &owner, student.id).await?.is_none());
        assert!(Enrollment::find().all(&db).await?.is_empty());
        assert!(Payment::find().all(&db).await?.is_empty());
        assert!(AssessmentScore::find().all(&db).await?.is_empty());
        assert!(Attendance::find().all(&db).await?.is_empty());

        Ok(())
    }
}
