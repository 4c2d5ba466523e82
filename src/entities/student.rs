//! Student entity - A learner on one owner's roster.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment status of a student, stored as a three letter code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum StudentStatus {
    /// Currently attending
    #[sea_orm(string_value = "ACT")]
    Active,
    /// Temporarily away
    #[sea_orm(string_value = "LVE")]
    OnLeave,
    /// Left the program
    #[sea_orm(string_value = "DRP")]
    Dropped,
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Active => "Active",
            Self::OnLeave => "On Leave",
            Self::Dropped => "Dropped Out",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "act" | "active" => Ok(Self::Active),
            "lve" | "leave" | "on leave" | "on_leave" => Ok(Self::OnLeave),
            "drp" | "dropped" | "dropped out" => Ok(Self::Dropped),
            other => Err(format!("unknown student status '{other}'")),
        }
    }
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this student belongs to
    pub owner_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Optional school-issued student code
    pub student_code: Option<String>,
    /// Optional contact email
    pub email: Option<String>,
    /// Current status
    pub status: StudentStatus,
    /// When the student was added to the roster
    pub date_added: DateTimeUtc,
}

impl Model {
    /// "First Last" display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many enrollments
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// One student has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    /// One student has many attendance records
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
