//! Grade averaging.
//!
//! An enrollment's average is `Σ score / Σ max_score × 100`, weighted by each
//! assessment's max score so a 5 point quiz does not count as much as a 100
//! point exam. The `average` column on the enrollment is only a cache: it is
//! rebuilt from the full score history every time a score is appended, in the
//! same transaction as the append.

use crate::{
    core::{enrollment, tenant::OwnerId},
    entities::{AssessmentScore, assessment_score, enrollment as enrollment_entity},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// A freshly recorded score together with the enrollment it updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedScore {
    /// The appended score row
    pub score: assessment_score::Model,
    /// The enrollment with its recomputed average
    pub enrollment: enrollment_entity::Model,
}

/// Weighted percentage over `(score, max_score)` pairs, rounded to one decimal.
///
/// Returns `None` when there is nothing to average: an ungraded enrollment is
/// not the same as one averaging zero.
pub fn weighted_average<I>(scores: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let (obtained, possible) = scores
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(obtained, possible), (score, max)| {
            (obtained + score, possible + max)
        });

    if possible.is_zero() {
        return None;
    }

    let percent = (obtained * Decimal::ONE_HUNDRED).checked_div(possible)?;
    Some(percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Checks that a score pair can be recorded.
///
/// # Errors
/// `Error::Validation` when `max_score` is not positive, `score` is negative,
/// or `score` exceeds `max_score`.
pub fn validate_score(score: Decimal, max_score: Decimal) -> Result<()> {
    if max_score <= Decimal::ZERO {
        return Err(Error::Validation {
            message: format!("Max score must be positive, got {max_score}"),
        });
    }
    if score < Decimal::ZERO {
        return Err(Error::Validation {
            message: format!("Score cannot be negative, got {score}"),
        });
    }
    if score > max_score {
        return Err(Error::Validation {
            message: format!("Score {score} exceeds max score {max_score}"),
        });
    }
    Ok(())
}

/// All scores of one enrollment, in the order they were taken.
pub async fn get_scores_for_enrollment<C>(
    db: &C,
    owner: &OwnerId,
    enrollment_id: i64,
) -> Result<Vec<assessment_score::Model>>
where
    C: ConnectionTrait,
{
    AssessmentScore::find()
        .filter(assessment_score::Column::OwnerId.eq(owner.as_str()))
        .filter(assessment_score::Column::EnrollmentId.eq(enrollment_id))
        .order_by_asc(assessment_score::Column::Date)
        .order_by_asc(assessment_score::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rebuilds the cached average of an enrollment from its full score history.
pub async fn recalculate_average<C>(
    db: &C,
    owner: &OwnerId,
    enrollment_id: i64,
) -> Result<enrollment_entity::Model>
where
    C: ConnectionTrait,
{
    let existing = enrollment::get_enrollment_by_id(db, owner, enrollment_id)
        .await?
        .ok_or(Error::EnrollmentNotFound { id: enrollment_id })?;

    let scores = get_scores_for_enrollment(db, owner, enrollment_id).await?;
    let average = weighted_average(scores.iter().map(|s| (s.score, s.max_score)));

    let mut active: enrollment_entity::ActiveModel = existing.into();
    active.average = Set(average);
    active.update(db).await.map_err(Into::into)
}

/// Appends a score and refreshes the enrollment average atomically.
pub async fn record_score(
    db: &DatabaseConnection,
    owner: &OwnerId,
    enrollment_id: i64,
    description: String,
    score: Decimal,
    max_score: Decimal,
    date: NaiveDate,
) -> Result<RecordedScore> {
    validate_score(score, max_score)?;
    if description.trim().is_empty() {
        return Err(Error::Validation {
            message: "Assessment description cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    enrollment::get_enrollment_by_id(&txn, owner, enrollment_id)
        .await?
        .ok_or(Error::EnrollmentNotFound { id: enrollment_id })?;

    let new_score = assessment_score::ActiveModel {
        owner_id: Set(owner.as_str().to_string()),
        enrollment_id: Set(enrollment_id),
        description: Set(description.trim().to_string()),
        score: Set(score),
        max_score: Set(max_score),
        date: Set(date),
        ..Default::default()
    };
    let inserted = new_score.insert(&txn).await?;
    let updated = recalculate_average(&txn, owner, enrollment_id).await?;

    txn.commit().await?;

    info!(
        owner = %owner,
        enrollment_id,
        average = ?updated.average,
        "Recorded score {score}/{max_score}"
    );
    Ok(RecordedScore {
        score: inserted,
        enrollment: updated,
    })
}
