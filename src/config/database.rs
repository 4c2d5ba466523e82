//! Database configuration module for Classbook.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The attendance natural key
//! (course, student, day) is backed by a unique index so that marking the same
//! session twice resolves to a single row.

use crate::entities::{
    AssessmentScore, Attendance, Course, Enrollment, Payment, Student, attendance,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/classbook.sqlite?mode=rwc";

/// Name of the unique index enforcing one attendance mark per session.
pub const ATTENDANCE_NATURAL_KEY: &str = "idx_attendance_course_student_date";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables (if missing) plus the attendance natural-key index.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut course_table = schema.create_table_from_entity(Course);
    let mut student_table = schema.create_table_from_entity(Student);
    let mut enrollment_table = schema.create_table_from_entity(Enrollment);
    let mut payment_table = schema.create_table_from_entity(Payment);
    let mut attendance_table = schema.create_table_from_entity(Attendance);
    let mut score_table = schema.create_table_from_entity(AssessmentScore);

    for table in [
        &mut course_table,
        &mut student_table,
        &mut enrollment_table,
        &mut payment_table,
        &mut attendance_table,
        &mut score_table,
    ] {
        db.execute(builder.build(table.if_not_exists())).await?;
    }

    let natural_key = Index::create()
        .name(ATTENDANCE_NATURAL_KEY)
        .table(Attendance)
        .col(attendance::Column::CourseId)
        .col(attendance::Column::StudentId)
        .col(attendance::Column::Date)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&natural_key)).await?;

    Ok(())
}
