//! Attendance entity - One status per (course, student, day).
//!
//! The natural key is enforced by a unique index created alongside the table
//! in `config::database::create_tables`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance mark for one session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum AttendanceStatus {
    /// Attended the session
    #[sea_orm(string_value = "P")]
    Present,
    /// Missed the session
    #[sea_orm(string_value = "A")]
    Absent,
    /// Arrived late
    #[sea_orm(string_value = "L")]
    Late,
    /// Missed with an accepted excuse
    #[sea_orm(string_value = "E")]
    Excused,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Late => "Late",
            Self::Excused => "Excused",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p" | "present" => Ok(Self::Present),
            "a" | "absent" => Ok(Self::Absent),
            "l" | "late" => Ok(Self::Late),
            "e" | "excused" => Ok(Self::Excused),
            other => Err(format!("unknown attendance status '{other}'")),
        }
    }
}

/// Attendance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this record belongs to
    pub owner_id: String,
    /// Course the session belongs to
    pub course_id: i64,
    /// Student being marked
    pub student_id: i64,
    /// Session day
    pub date: Date,
    /// Mark for the day
    pub status: AttendanceStatus,
}

/// Defines relationships between Attendance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each record belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
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

impl ActiveModelBehavior for ActiveModel {}
