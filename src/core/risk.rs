//! Dropout risk scoring.
//!
//! Rules accumulate: an unpaid balance over 500 adds 50, over 1000 adds a
//! further 30, no active course adds 40 and a single active course adds 10.
//! The result is clamped to `0..=100`.

use crate::{
    core::{enrollment, ledger, student, tenant::OwnerId},
    entities::student as student_entity,
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::fmt;

const MODERATE_BALANCE: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
const SEVERE_BALANCE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Risk band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    /// Score of 40 or below
    Low,
    /// Score above 40
    Moderate,
    /// Score above 75
    Critical,
}

impl RiskLevel {
    /// Band for a clamped score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score > 75 {
            Self::Critical
        } else if score > 40 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Status emoji used in reports.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Moderate => "🟡",
            Self::Critical => "🔴",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Score and band for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    /// 0 to 100
    pub score: u8,
    /// Band of `score`
    pub level: RiskLevel,
}

/// A student together with the inputs and result of their assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRisk {
    /// The assessed student
    pub student: student_entity::Model,
    /// Current balance
    pub balance: Decimal,
    /// Number of active enrollments
    pub course_count: usize,
    /// Resulting score and band
    pub assessment: RiskAssessment,
}

/// Scores a student from their balance and active course count.
#[must_use]
pub fn score_risk(balance: Decimal, course_count: usize) -> RiskAssessment {
    let mut score: u32 = 0;
    if balance > MODERATE_BALANCE {
        score += 50;
    }
    if balance > SEVERE_BALANCE {
        score += 30;
    }
    match course_count {
        0 => score += 40,
        1 => score += 10,
        _ => {}
    }

    let score = u8::try_from(score.min(100)).unwrap_or(100);
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
    }
}

/// Assesses one student of the owner.
pub async fn assess_student(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
) -> Result<StudentRisk> {
    let student = student::require_student(db, owner, student_id).await?;
    let balance = ledger::get_student_balance(db, owner, student_id).await?;
    let course_count = enrollment::count_active_courses(db, owner, student_id).await?;

    Ok(StudentRisk {
        student,
        balance,
        course_count,
        assessment: score_risk(balance, course_count),
    })
}

/// Assesses every student of the owner, highest score first.
pub async fn assess_all_students(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<StudentRisk>> {
    let students = student::get_all_students(db, owner).await?;

    let mut results = Vec::with_capacity(students.len());
    for student in students {
        let balance = ledger::get_student_balance(db, owner, student.id).await?;
        let course_count = enrollment::count_active_courses(db, owner, student.id).await?;
        results.push(StudentRisk {
            assessment: score_risk(balance, course_count),
            student,
            balance,
            course_count,
        });
    }

    results.sort_by(|a, b| b.assessment.score.cmp(&a.assessment.score));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_thresholds_are_strict() {
        let at_threshold = score_risk(dec!(500), 2);
        assert_eq!(at_threshold.score, 0);
        assert_eq!(at_threshold.level, RiskLevel::Low);

        let over = score_risk(dec!(501), 2);
        assert_eq!(over.score, 50);
        assert_eq!(over.level.to_string(), "Moderate Risk");

        assert_eq!(score_risk(dec!(1000), 3).score, 50);
        assert_eq!(score_risk(dec!(1000.01), 3).score, 80);
    }

    #[test]
    fn test_score_is_clamped() {
        let worst = score_risk(dec!(1001), 0);
        assert_eq!(worst.score, 100);
        assert_eq!(worst.level.to_string(), "Critical");
    }

    #[test]
    fn test_course_count_rules() {
        assert_eq!(score_risk(Decimal::ZERO, 0).score, 40);
        assert_eq!(score_risk(Decimal::ZERO, 0).level, RiskLevel::Low);
        assert_eq!(score_risk(Decimal::ZERO, 1).score, 10);
        assert_eq!(score_risk(dec!(600), 1).score, 60);
        assert_eq!(score_risk(dec!(-2000), 5).score, 0);
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(41), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::Critical);
        assert_eq!(RiskLevel::Low.to_string(), "Low Risk");
    }

    #[tokio::test]
    async fn test_assess_all_students_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();

        // Enrolled in one 100.00 course, nothing paid: 10
        let (enrolled, _) = setup_enrolled_student(&db, &owner).await?;
        // No courses and a 600.00 refund owed back: 40 + 50
        let idle = create_test_student(&db, &owner, "Idle", "Student").await?;
        create_test_payment(&db, &owner, idle.id, dec!(-600)).await?;

        let results = assess_all_students(&db, &owner).await?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].student.id, idle.id);
        assert_eq!(results[0].balance, dec!(600));
        assert_eq!(results[0].assessment.score, 90);
        assert_eq!(results[0].assessment.level, RiskLevel::Critical);
        assert_eq!(results[1].student.id, enrolled.id);
        assert_eq!(results[1].course_count, 1);
        assert_eq!(results[1].assessment.score, 10);

        let single = assess_student(&db, &owner, enrolled.id).await?;
        assert_eq!(single.assessment, results[1].assessment);

        assert!(assess_all_students(&db, &other_owner()).await?.is_empty());

        Ok(())
    }
}
