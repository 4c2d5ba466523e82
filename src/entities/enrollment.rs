//! Enrollment entity - A student's membership in one course.
//!
//! `charge` is a snapshot of the course cost taken when the student joined.
//! `average` is a cache derived from the enrollment's assessment scores and is
//! only ever written by `core::grades::record_score`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this enrollment belongs to
    pub owner_id: String,
    /// Enrolled student
    pub student_id: i64,
    /// Course the student joined
    pub course_id: i64,
    /// Course cost at enrollment time
    pub charge: Decimal,
    /// First day of the enrollment
    pub start_date: Date,
    /// Last day, set when the enrollment is closed
    pub end_date: Option<Date>,
    /// Whether the enrollment is still running
    pub is_active: bool,
    /// Course schedule at enrollment time
    pub schedule_snapshot: Option<String>,
    /// Weighted grade percentage, `None` until the first score is recorded
    pub average: Option<Decimal>,
}

/// Defines relationships between Enrollment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each enrollment belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each enrollment belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    /// One enrollment has many assessment scores
    #[sea_orm(has_many = "super::assessment_score::Entity")]
    Scores,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::assessment_score::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
