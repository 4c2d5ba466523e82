//! Payment entity - Append-only ledger entries.
//!
//! Positive amounts are money received, negative amounts are refunds or
//! adjustments. Rows are never updated once written.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner (tenant) this payment belongs to
    pub owner_id: String,
    /// Paying student
    pub student_id: i64,
    /// Signed amount (positive = received)
    pub amount: Decimal,
    /// Day the payment was made
    pub payment_date: Date,
    /// Free-text note
    pub notes: Option<String>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
