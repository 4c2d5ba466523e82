//! Ledger aggregation.
//!
//! A student's balance is what they have been charged (the sum of their
//! enrollment charge snapshots) minus what they have paid. Balances are exact
//! decimals and may go negative when a student has prepaid; they are never
//! clamped. The reducers here are pure; the `get_*` functions load the owner's
//! records and hand them to the reducers.

use crate::{
    core::{course, enrollment, payment, student, tenant::OwnerId},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Totals across every student of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    /// Sum of all payments received
    pub total_revenue: Decimal,
    /// Sum of all enrollment charges
    pub total_charges: Decimal,
    /// `total_charges - total_revenue`
    pub total_owed: Decimal,
    /// Sum of positive per-student balances (prepaid credit ignored)
    pub outstanding_fees: Decimal,
}

/// Dashboard figures for one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    /// Money totals
    pub totals: LedgerTotals,
    /// Students on the roster
    pub student_count: usize,
    /// Courses in the catalog
    pub course_count: usize,
}

/// `Σ charges − Σ payments`. Empty inputs give exactly zero.
pub fn balance<C, P>(charges: C, payments: P) -> Decimal
where
    C: IntoIterator<Item = Decimal>,
    P: IntoIterator<Item = Decimal>,
{
    let charged: Decimal = charges.into_iter().sum();
    let paid: Decimal = payments.into_iter().sum();
    charged - paid
}

/// Reduces `(student_id, amount)` charge and payment streams into owner totals.
pub fn totals<C, P>(charges: C, payments: P) -> LedgerTotals
where
    C: IntoIterator<Item = (i64, Decimal)>,
    P: IntoIterator<Item = (i64, Decimal)>,
{
    let mut per_student: BTreeMap<i64, Decimal> = BTreeMap::new();
    let mut total_charges = Decimal::ZERO;
    let mut total_revenue = Decimal::ZERO;

    for (student_id, charge) in charges {
        total_charges += charge;
        *per_student.entry(student_id).or_default() += charge;
    }
    for (student_id, amount) in payments {
        total_revenue += amount;
        *per_student.entry(student_id).or_default() -= amount;
    }

    let outstanding_fees = per_student
        .values()
        .filter(|balance| balance.is_sign_positive() && !balance.is_zero())
        .copied()
        .sum();

    LedgerTotals {
        total_revenue,
        total_charges,
        total_owed: total_charges - total_revenue,
        outstanding_fees,
    }
}

/// Current balance of one student.
pub async fn get_student_balance(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
) -> Result<Decimal> {
    let enrollments = enrollment::get_enrollments_for_student(db, owner, student_id).await?;
    let payments = payment::get_payments_for_student(db, owner, student_id).await?;

    Ok(balance(
        enrollments.iter().map(|e| e.charge),
        payments.iter().map(|p| p.amount),
    ))
}

/// Revenue, charges, amounts owed and roster counts for one owner.
pub async fn get_ledger_summary(db: &DatabaseConnection, owner: &OwnerId) -> Result<LedgerSummary> {
    let enrollments = enrollment::get_all_enrollments(db, owner).await?;
    let payments = payment::get_all_payments(db, owner).await?;
    let student_count = student::get_all_students(db, owner).await?.len();
    let course_count = course::get_all_courses(db, owner).await?.len();

    let totals = totals(
        enrollments.iter().map(|e| (e.student_id, e.charge)),
        payments.iter().map(|p| (p.student_id, p.amount)),
    );

    Ok(LedgerSummary {
        totals,
        student_count,
        course_count,
    })
}
