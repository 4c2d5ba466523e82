//! Course entity - A course offering sold by one owner.
//!
//! The `cost` is the current list price. Enrollments copy it at enrollment time,
//! so changing it later never rewrites what existing students were charged.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Unique identifier for the course
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this course belongs to
    pub owner_id: String,
    /// Display name (e.g., "Algebra I")
    pub name: String,
    /// Optional short catalog code
    pub course_code: Option<String>,
    /// Current price charged on enrollment
    pub cost: Decimal,
    /// Free-text schedule such as "Mon/Wed @ 04:30 PM"
    pub schedule: Option<String>,
}

/// Defines relationships between Course and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One course has many enrollments
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// One course has many attendance records
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
