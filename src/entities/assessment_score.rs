//! Assessment score entity - Append-only graded work for one enrollment.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assessment score database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assessment_scores")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this score belongs to
    pub owner_id: String,
    /// Enrollment being graded
    pub enrollment_id: i64,
    /// What was assessed (e.g., "Quiz 3")
    pub description: String,
    /// Points obtained
    pub score: Decimal,
    /// Points available for this assessment
    pub max_score: Decimal,
    /// Day the assessment was taken
    pub date: Date,
}

/// Defines relationships between `AssessmentScore` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each score belongs to one enrollment
    #[sea_orm(
        belongs_to = "super::enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollment::Column::Id"
    )]
    Enrollment,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
