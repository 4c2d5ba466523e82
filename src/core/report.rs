//! Report generation and display formatting.
//!
//! Collects everything known about one student into a [`StudentReport`] and
//! provides the small text helpers the bot uses to render money, averages and
//! attendance.

use crate::{
    core::{
        attendance::{self, AttendanceSummary},
        enrollment, ledger, payment,
        risk::{self, RiskAssessment},
        student,
        tenant::OwnerId,
    },
    entities::{enrollment as enrollment_entity, payment as payment_entity, student as student_entity},
    errors::Result,
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::DatabaseConnection;

/// Everything shown for one student.
#[derive(Debug, Clone)]
pub struct StudentReport {
    /// The student
    pub student: student_entity::Model,
    /// Charges minus payments
    pub balance: Decimal,
    /// Enrollment history, newest first
    pub enrollments: Vec<enrollment_entity::Model>,
    /// Most recent payments, newest first
    pub recent_payments: Vec<payment_entity::Model>,
    /// Attendance across all courses
    pub attendance: AttendanceSummary,
    /// Dropout risk
    pub risk: RiskAssessment,
}

impl StudentReport {
    /// Number of enrollments still running.
    #[must_use]
    pub fn active_course_count(&self) -> usize {
        self.enrollments.iter().filter(|e| e.is_active).count()
    }
}

/// Builds the report for one student of the owner.
pub async fn generate_student_report(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    recent_payment_limit: u64,
) -> Result<StudentReport> {
    let student = student::require_student(db, owner, student_id).await?;
    let enrollments = enrollment::get_enrollments_for_student(db, owner, student_id).await?;
    let recent_payments =
        payment::get_recent_payments(db, owner, student_id, recent_payment_limit).await?;
    let attendance = attendance::get_attendance_summary(db, owner, student_id, None).await?;
    let balance = ledger::get_student_balance(db, owner, student_id).await?;

    let course_count = enrollments.iter().filter(|e| e.is_active).count();
    Ok(StudentReport {
        student,
        balance,
        enrollments,
        recent_payments,
        attendance,
        risk: risk::score_risk(balance, course_count),
    })
}

/// Formats money with two decimals and a leading sign for negatives, e.g. `-$12.50`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Formats a cached average, distinguishing "no grades" from zero.
#[must_use]
pub fn format_average(average: Option<Decimal>) -> String {
    average.map_or_else(|| "Ungraded".to_string(), |a| format!("{a:.1}%"))
}

/// Formats a visual bar for a 0-100 percentage.
#[must_use]
pub fn format_progress_bar(percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = percent.clamp(0.0, 100.0);

    // clamped is within 0..=100 and length is small, so the result fits in 0..=length
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}] {percent:.1}%", "█".repeat(filled), "░".repeat(empty))
}

/// One-line attendance summary, e.g. `3 present, 1 absent, 0 late, 0 excused`.
#[must_use]
pub fn format_attendance(summary: &AttendanceSummary) -> String {
    summary
        .counts()
        .iter()
        .map(|(status, count)| format!("{count} {}", status.to_string().to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line payment summary, e.g. `2025-01-03: $25.00 (cash)`.
#[must_use]
pub fn format_payment_summary(payment: &payment_entity::Model) -> String {
    let mut line = format!("{}: {}", payment.payment_date, format_money(payment.amount));
    if let Some(notes) = &payment.notes {
        line.push_str(&format!(" ({notes})"));
    }
    line
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::AttendanceStatus, test_utils::*};
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(12.5)), "$12.50");
        assert_eq!(format_money(dec!(-12.5)), "-$12.50");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(dec!(0.005)), "$0.01");
        assert_eq!(format_money(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(None), "Ungraded");
        assert_eq!(format_average(Some(dec!(0))), "0.0%");
        assert_eq!(format_average(Some(dec!(52.4))), "52.4%");
    }

    #[test]
    fn test_format_progress_bar() {
        assert_eq!(format_progress_bar(100.0, Some(10)), "[██████████] 100.0%");
        assert_eq!(format_progress_bar(50.0, Some(10)), "[█████░░░░░] 50.0%");
        assert_eq!(format_progress_bar(0.0, None), "[░░░░░░░░░░] 0.0%");
        assert_eq!(format_progress_bar(150.0, Some(4)), "[████] 150.0%");
    }

    #[test]
    fn test_format_attendance() {
        let summary = attendance::summarize([AttendanceStatus::Present, AttendanceStatus::Late]);
        assert_eq!(
            format_attendance(&summary),
            "1 present, 0 absent, 1 late, 0 excused"
        );
    }

    #[tokio::test]
    async fn test_generate_student_report() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let (student, enrollment) = setup_enrolled_student(&db, &owner).await?;

        for amount in [dec!(10), dec!(20), dec!(30)] {
            create_test_payment(&db, &owner, student.id, amount).await?;
        }
        attendance::mark_attendance(
            &db,
            &owner,
            enrollment.course_id,
            student.id,
            test_date(2),
            AttendanceStatus::Present,
        )
        .await?;

        let report = generate_student_report(&db, &owner, student.id, 2).await?;
        assert_eq!(report.balance, dec!(40));
        assert_eq!(report.recent_payments.len(), 2);
        assert_eq!(report.enrollments.len(), 1);
        assert_eq!(report.active_course_count(), 1);
        assert_eq!(report.attendance.present, 1);
        assert_eq!(report.risk.score, 10);

        let summary = format_payment_summary(&report.recent_payments[0]);
        assert!(summary.starts_with("2025-01-01: $"));

        Ok(())
    }
}
