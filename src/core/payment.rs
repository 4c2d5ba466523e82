//! Payment business logic - Append-only ledger entries.
//!
//! Payments are recorded and listed, never edited. A positive amount is money
//! received; a negative amount is a refund or correction. Zero is rejected.

use crate::{
    core::{student, tenant::OwnerId},
    entities::{Payment, payment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::info;

/// Records a payment from a student.
pub async fn record_payment(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    amount: Decimal,
    payment_date: NaiveDate,
    notes: Option<String>,
) -> Result<payment::Model> {
    if amount.is_zero() {
        return Err(Error::InvalidAmount { amount });
    }

    student::require_student(db, owner, student_id).await?;

    let payment = payment::ActiveModel {
        owner_id: Set(owner.as_str().to_string()),
        student_id: Set(student_id),
        amount: Set(amount),
        payment_date: Set(payment_date),
        notes: Set(notes.filter(|n| !n.trim().is_empty())),
        ..Default::default()
    };

    let result = payment.insert(db).await?;
    info!(owner = %owner, student_id, payment_id = result.id, "Recorded payment of {amount}");
    Ok(result)
}

/// All payments of one student, newest first.
pub async fn get_payments_for_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::OwnerId.eq(owner.as_str()))
        .filter(payment::Column::StudentId.eq(student_id))
        .order_by_desc(payment::Column::PaymentDate)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The `limit` most recent payments of one student.
pub async fn get_recent_payments(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    limit: u64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::OwnerId.eq(owner.as_str()))
        .filter(payment::Column::StudentId.eq(student_id))
        .order_by_desc(payment::Column::PaymentDate)
        .order_by_desc(payment::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every payment of the owner, oldest first.
pub async fn get_all_payments(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::OwnerId.eq(owner.as_str()))
        .order_by_asc(payment::Column::PaymentDate)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_zero_payment_rejected() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result =
            record_payment(&db, &test_owner(), 1, Decimal::ZERO, test_date(1), None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_for_unknown_student_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let foreign = create_test_student(&db, &other_owner(), "Not", "Mine").await?;

        let result =
            record_payment(&db, &test_owner(), foreign.id, dec!(10), test_date(1), None).await;
        assert!(matches!(result.unwrap_err(), Error::StudentNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_payments_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let student = create_test_student(&db, &owner, "Rosalind", "Franklin").await?;

        let early = record_payment(
            &db,
            &owner,
            student.id,
            dec!(25.10),
            test_date(3),
            Some("cash".to_string()),
        )
        .await?;
        let late = record_payment(&db, &owner, student.id, dec!(-5), test_date(9), None).await?;

        let payments = get_payments_for_student(&db, &owner, student.id).await?;
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].id, late.id);
        assert_eq!(payments[1].id, early.id);
        assert_eq!(payments[1].amount, dec!(25.10));
        assert_eq!(payments[1].notes.as_deref(), Some("cash"));

        let recent = get_recent_payments(&db, &owner, student.id, 1).await?;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, late.id);

        let all = get_all_payments(&db, &owner).await?;
        assert_eq!(all[0].id, early.id);
        assert!(get_all_payments(&db, &other_owner()).await?.is_empty());

        Ok(())
    }
}
