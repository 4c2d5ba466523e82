//! Course business logic - Handles the owner's course catalog.
//!
//! Provides functions for creating, retrieving, updating, and deleting courses.
//! All functions are scoped to an owner and return Result types for error handling.

use crate::{
    core::tenant::OwnerId,
    entities::{Course, Enrollment, course, enrollment},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves all of the owner's courses, ordered alphabetically by name.
pub async fn get_all_courses(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<course::Model>> {
    Course::find()
        .filter(course::Column::OwnerId.eq(owner.as_str()))
        .order_by_asc(course::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a course by id, returning None if it does not exist or belongs to another owner.
pub async fn get_course_by_id<C>(
    db: &C,
    owner: &OwnerId,
    course_id: i64,
) -> Result<Option<course::Model>>
where
    C: ConnectionTrait,
{
    Course::find_by_id(course_id)
        .filter(course::Column::OwnerId.eq(owner.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a course by its exact name within the owner's catalog.
pub async fn get_course_by_name(
    db: &DatabaseConnection,
    owner: &OwnerId,
    name: &str,
) -> Result<Option<course::Model>> {
    Course::find()
        .filter(course::Column::OwnerId.eq(owner.as_str()))
        .filter(course::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new course after validating the name and cost.
///
/// The name is trimmed, must not be empty and must be unique within the owner's
/// catalog; the cost must not be negative.
pub async fn create_course(
    db: &DatabaseConnection,
    owner: &OwnerId,
    name: String,
    course_code: Option<String>,
    cost: Decimal,
    schedule: Option<String>,
) -> Result<course::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Course name cannot be empty".to_string(),
        });
    }

    if cost < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount: cost });
    }

    if get_course_by_name(db, owner, &name).await?.is_some() {
        return Err(Error::Validation {
            message: format!("A course named '{}' already exists", name.trim()),
        });
    }

    let course = course::ActiveModel {
        owner_id: Set(owner.as_str().to_string()),
        name: Set(name.trim().to_string()),
        course_code: Set(course_code),
        cost: Set(cost),
        schedule: Set(schedule),
        ..Default::default()
    };

    let result = course.insert(db).await?;
    info!(owner = %owner, course_id = result.id, "Created course '{}'", result.name);
    Ok(result)
}

/// Updates the mutable fields of a course. `None` leaves a field unchanged.
///
/// Existing enrollments keep the charge they were created with.
pub async fn update_course(
    db: &DatabaseConnection,
    owner: &OwnerId,
    course_id: i64,
    cost: Option<Decimal>,
    course_code: Option<String>,
    schedule: Option<String>,
) -> Result<course::Model> {
    let existing = get_course_by_id(db, owner, course_id)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            id: course_id.to_string(),
        })?;

    let mut active: course::ActiveModel = existing.into();
    if let Some(cost) = cost {
        if cost < Decimal::ZERO {
            return Err(Error::InvalidAmount { amount: cost });
        }
        active.cost = Set(cost);
    }
    if let Some(code) = course_code {
        active.course_code = Set(Some(code));
    }
    if let Some(schedule) = schedule {
        active.schedule = Set(Some(schedule));
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a course that has never had an enrollment.
///
/// Courses with enrollment history are kept so the ledger stays reconstructable.
pub async fn delete_course(db: &DatabaseConnection, owner: &OwnerId, course_id: i64) -> Result<()> {
    let existing = get_course_by_id(db, owner, course_id)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            id: course_id.to_string(),
        })?;

    let enrollment_count = Enrollment::find()
        .filter(enrollment::Column::OwnerId.eq(owner.as_str()))
        .filter(enrollment::Column::CourseId.eq(course_id))
        .count(db)
        .await?;

    if enrollment_count > 0 {
        return Err(Error::Validation {
            message: format!(
                "Course '{}' has {enrollment_count} enrollment(s) and cannot be deleted",
                existing.name
            ),
        });
    }

    existing.delete(db).await?;
    info!(owner = %owner, course_id, "Deleted course");
    Ok(())
}
