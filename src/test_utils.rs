//! Shared test utilities for Classbook.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        OwnerId, course, enrollment, payment,
        student::{self, NewStudent},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The owner most tests act as.
pub fn test_owner() -> OwnerId {
    OwnerId::new("test_user").unwrap()
}

/// A second owner whose records must stay invisible to [`test_owner`].
pub fn other_owner() -> OwnerId {
    OwnerId::new("other_user").unwrap()
}

/// A fixed day in January 2025, so tests never depend on the clock.
pub fn test_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

/// Creates a test course with sensible defaults.
///
/// # Defaults
/// * `course_code`: None
/// * `cost`: 100
/// * `schedule`: "Mon 10:00"
pub async fn create_test_course(
    db: &DatabaseConnection,
    owner: &OwnerId,
    name: &str,
) -> Result<entities::course::Model> {
    create_custom_course(db, owner, name, Decimal::ONE_HUNDRED).await
}

/// Creates a test course with a custom cost.
pub async fn create_custom_course(
    db: &DatabaseConnection,
    owner: &OwnerId,
    name: &str,
    cost: Decimal,
) -> Result<entities::course::Model> {
    course::create_course(
        db,
        owner,
        name.to_string(),
        None,
        cost,
        Some("Mon 10:00".to_string()),
    )
    .await
}

/// Creates an active test student with no code or email.
pub async fn create_test_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    first_name: &str,
    last_name: &str,
) -> Result<entities::student::Model> {
    student::create_student(db, owner, NewStudent::named(first_name, last_name)).await
}

/// Records a payment dated [`test_date`]`(1)`.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    amount: Decimal,
) -> Result<entities::payment::Model> {
    payment::record_payment(db, owner, student_id, amount, test_date(1), None).await
}

/// Sets up a student enrolled in a 100.00 course starting [`test_date`]`(1)`.
/// Returns (student, enrollment) for common test scenarios.
pub async fn setup_enrolled_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<(entities::student::Model, entities::enrollment::Model)> {
    let course = create_test_course(db, owner, "Test Course").await?;
    let student = create_test_student(db, owner, "Test", "Student").await?;
    let mut created =
        enrollment::enroll_students_on(db, owner, course.id, &[student.id], test_date(1)).await?;
    Ok((student, created.remove(0)))
}
