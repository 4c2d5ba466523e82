//! Enrollment business logic - Roster membership and charge snapshots.
//!
//! Enrolling copies the course's current cost into the enrollment. That copy is
//! what the ledger charges, so later price changes never touch existing students.
//! Enrollments are closed rather than deleted.

use crate::{
    core::{course, input, student, tenant::OwnerId},
    entities::{Enrollment, enrollment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{debug, info};

/// Finds an enrollment by id within the owner's records.
pub async fn get_enrollment_by_id<C>(
    db: &C,
    owner: &OwnerId,
    enrollment_id: i64,
) -> Result<Option<enrollment::Model>>
where
    C: ConnectionTrait,
{
    Enrollment::find_by_id(enrollment_id)
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the active enrollment of a student in a course, if any.
pub async fn get_active_enrollment<C>(
    db: &C,
    owner: &OwnerId,
    student_id: i64,
    course_id: i64,
) -> Result<Option<enrollment::Model>>
where
    C: ConnectionTrait,
{
    Enrollment::find()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::CourseId.eq(course_id))
        .filter(enrollment::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Full enrollment history of a student, newest first.
pub async fn get_enrollments_for_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
) -> Result<Vec<enrollment::Model>> {
    Enrollment::find()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .order_by_desc(enrollment::Column::StartDate)
        .order_by_desc(enrollment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every enrollment (active and closed) the owner has ever recorded.
pub async fn get_all_enrollments(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<enrollment::Model>> {
    Enrollment::find()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .order_by_asc(enrollment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of courses the student is currently enrolled in.
pub async fn count_active_courses(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
) -> Result<usize> {
    let count = Enrollment::find()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::StudentId.eq(student_id))
        .filter(enrollment::Column::IsActive.eq(true))
        .count(db)
        .await?;
    Ok(usize::try_from(count)?)
}

/// Enrolls students in a course, starting today.
///
/// See [`enroll_students_on`].
pub async fn enroll_students(
    db: &DatabaseConnection,
    owner: &OwnerId,
    course_id: i64,
    student_ids: &[i64],
) -> Result<Vec<enrollment::Model>> {
    enroll_students_on(db, owner, course_id, student_ids, input::today()).await
}

/// Enrolls each listed student that is not already actively enrolled in the course.
///
/// Every new enrollment snapshots the course cost and schedule. Students that
/// are already active in the course are skipped, duplicates in `student_ids`
/// are ignored, and an unknown student aborts the whole batch.
pub async fn enroll_students_on(
    db: &DatabaseConnection,
    owner: &OwnerId,
    course_id: i64,
    student_ids: &[i64],
    start_date: NaiveDate,
) -> Result<Vec<enrollment::Model>> {
    let txn = db.begin().await?;

    let course = course::get_course_by_id(&txn, owner, course_id)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            id: course_id.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut created = Vec::new();

    for &student_id in student_ids {
        if !seen.insert(student_id) {
            continue;
        }

        student::require_student(&txn, owner, student_id).await?;

        if get_active_enrollment(&txn, owner, student_id, course_id)
            .await?
            .is_some()
        {
            debug!(student_id, course_id, "Already enrolled, skipping");
            continue;
        }

        let new_enrollment = enrollment::ActiveModel {
            owner_id: Set(owner.as_str().to_string()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            charge: Set(course.cost),
            start_date: Set(start_date),
            end_date: Set(None),
            is_active: Set(true),
            schedule_snapshot: Set(course.schedule.clone()),
            average: Set(None),
            ..Default::default()
        };
        created.push(new_enrollment.insert(&txn).await?);
    }

    txn.commit().await?;

    info!(
        owner = %owner,
        course_id,
        enrolled = created.len(),
        "Updated roster for '{}'",
        course.name
    );
    Ok(created)
}

/// Closes an enrollment: marks it inactive and records the end date.
///
/// Closing keeps the charge on the ledger; the student still owes for the course.
pub async fn close_enrollment(
    db: &DatabaseConnection,
    owner: &OwnerId,
    enrollment_id: i64,
    end_date: NaiveDate,
) -> Result<enrollment::Model> {
    let existing = get_enrollment_by_id(db, owner, enrollment_id)
        .await?
        .ok_or(Error::EnrollmentNotFound { id: enrollment_id })?;

    if !existing.is_active {
        return Ok(existing);
    }

    if end_date < existing.start_date {
        return Err(Error::Validation {
            message: format!(
                "End date {end_date} is before the enrollment start {}",
                existing.start_date
            ),
        });
    }

    let mut active: enrollment::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.end_date = Set(Some(end_date));
    let updated = active.update(db).await?;

    info!(owner = %owner, enrollment_id, "Closed enrollment");
    Ok(updated)
}
