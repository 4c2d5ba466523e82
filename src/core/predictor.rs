//! Grade prediction by multivariate linear regression.
//!
//! The model is ordinary least squares with an intercept, fitted through the
//! normal equations `(XᵀX)β = Xᵀy` and solved by Cholesky decomposition.
//! Predictions are clamped to the `0..=100` grade range.

use crate::{
    core::{attendance, enrollment, ledger, tenant::OwnerId},
    errors::{Error, Result},
};
use ndarray::{Array1, Array2, Axis, s};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Most features a model accepts.
pub const MAX_FEATURES: usize = 4;

/// Features observed for every enrollment: present-rate in the course and the
/// student's balance.
pub const OBSERVED_FEATURES: [&str; 2] = ["attendance_rate", "balance"];

/// Errors from fitting or applying a [`GradePredictor`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictorError {
    /// Feature count outside `1..=MAX_FEATURES`
    #[error("Expected between 1 and {MAX_FEATURES} features, got {got}")]
    FeatureCount {
        /// Features supplied
        got: usize,
    },

    /// Row or column counts disagree
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Required length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// Fewer samples than parameters to estimate
    #[error("Need at least {needed} graded samples, got {got}")]
    TooFewSamples {
        /// Minimum sample count
        needed: usize,
        /// Samples supplied
        got: usize,
    },

    /// Features are collinear so no unique fit exists
    #[error("Features are collinear; the system has no unique solution")]
    SingularSystem,
}

/// A fitted linear grade model.
#[derive(Debug, Clone, PartialEq)]
pub struct GradePredictor {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl GradePredictor {
    /// Fits the model to `x` (one row per sample) and grades `y`.
    ///
    /// # Errors
    /// See [`PredictorError`].
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> std::result::Result<Self, PredictorError> {
        let n_features = x.ncols();
        if n_features == 0 || n_features > MAX_FEATURES {
            return Err(PredictorError::FeatureCount { got: n_features });
        }
        if x.nrows() != y.len() {
            return Err(PredictorError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let needed = n_features + 1;
        if x.nrows() < needed {
            return Err(PredictorError::TooFewSamples {
                needed,
                got: x.nrows(),
            });
        }

        let ones = Array2::<f64>::ones((x.nrows(), 1));
        let design = ndarray::concatenate(Axis(1), &[ones.view(), x.view()]).map_err(|_| {
            PredictorError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            }
        })?;

        let xt = design.t();
        let beta = cholesky_solve(&xt.dot(&design), &xt.dot(y))?;

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.slice(s![1..]).to_owned(),
        })
    }

    /// Fits from row slices, the shape the database layer produces.
    ///
    /// # Errors
    /// See [`PredictorError`].
    pub fn fit_rows(rows: &[Vec<f64>], targets: &[f64]) -> std::result::Result<Self, PredictorError> {
        let n_features = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != n_features) {
            return Err(PredictorError::DimensionMismatch {
                expected: n_features,
                got: bad.len(),
            });
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Array2::from_shape_vec((rows.len(), n_features), flat).map_err(|_| {
            PredictorError::DimensionMismatch {
                expected: rows.len() * n_features,
                got: rows.iter().map(Vec::len).sum(),
            }
        })?;
        Self::fit(&x, &Array1::from(targets.to_vec()))
    }

    /// Predicted grade for one feature vector, clamped to `0..=100`.
    ///
    /// # Errors
    /// `DimensionMismatch` when `features` has the wrong length.
    pub fn predict(&self, features: &[f64]) -> std::result::Result<f64, PredictorError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictorError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: features.len(),
            });
        }
        let raw = self.intercept + self.coefficients.dot(&Array1::from(features.to_vec()));
        Ok(raw.clamp(0.0, 100.0))
    }

    /// Fitted intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fitted coefficient per feature.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.as_slice().unwrap_or_default()
    }
}

/// Solves `a·x = b` for symmetric positive definite `a`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> std::result::Result<Array1<f64>, PredictorError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                // Relative tolerance: rounding leaves a tiny residue on collinear columns
                if diag <= 1e-10 * a[[i, i]].abs().max(1.0) {
                    return Err(PredictorError::SingularSystem);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(x)
}

/// One graded enrollment as a training row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    /// Source enrollment
    pub enrollment_id: i64,
    /// Values for [`OBSERVED_FEATURES`]
    pub features: Vec<f64>,
    /// Enrollment average
    pub target: f64,
}

/// Result of predicting one enrollment's grade.
#[derive(Debug, Clone, PartialEq)]
pub struct GradePrediction {
    /// Enrollment the prediction is for
    pub enrollment_id: i64,
    /// Inputs used for the prediction
    pub features: Vec<f64>,
    /// Predicted grade, 0 to 100
    pub predicted: f64,
    /// Training rows the model was fitted on
    pub sample_count: usize,
}

async fn observed_features(
    db: &DatabaseConnection,
    owner: &OwnerId,
    student_id: i64,
    course_id: i64,
) -> Result<Vec<f64>> {
    let summary = attendance::get_attendance_summary(db, owner, student_id, Some(course_id)).await?;
    let balance = ledger::get_student_balance(db, owner, student_id).await?;
    Ok(vec![
        summary.present_rate(),
        balance.to_f64().unwrap_or_default(),
    ])
}

/// Every graded enrollment of the owner except `exclude`.
pub async fn build_training_set(
    db: &DatabaseConnection,
    owner: &OwnerId,
    exclude: Option<i64>,
) -> Result<Vec<TrainingSample>> {
    let enrollments = enrollment::get_all_enrollments(db, owner).await?;

    let mut samples = Vec::new();
    for e in enrollments {
        if Some(e.id) == exclude {
            continue;
        }
        let Some(target) = e.average.and_then(|a| a.to_f64()) else {
            continue;
        };
        samples.push(TrainingSample {
            enrollment_id: e.id,
            features: observed_features(db, owner, e.student_id, e.course_id).await?,
            target,
        });
    }
    Ok(samples)
}

/// Fits on the owner's other graded enrollments and predicts this one.
pub async fn predict_enrollment(
    db: &DatabaseConnection,
    owner: &OwnerId,
    enrollment_id: i64,
) -> Result<GradePrediction> {
    let target = enrollment::get_enrollment_by_id(db, owner, enrollment_id)
        .await?
        .ok_or(Error::EnrollmentNotFound { id: enrollment_id })?;

    let samples = build_training_set(db, owner, Some(enrollment_id)).await?;
    let rows: Vec<Vec<f64>> = samples.iter().map(|s| s.features.clone()).collect();
    let targets: Vec<f64> = samples.iter().map(|s| s.target).collect();
    let model = GradePredictor::fit_rows(&rows, &targets).map_err(|e| match e {
        // An empty training set has no rows to infer the width from
        PredictorError::FeatureCount { .. } if samples.is_empty() => PredictorError::TooFewSamples {
            needed: OBSERVED_FEATURES.len() + 1,
            got: 0,
        },
        other => other,
    })?;

    let features = observed_features(db, owner, target.student_id, target.course_id).await?;
    let predicted = model.predict(&features)?;
    debug!(owner = %owner, enrollment_id, predicted, samples = samples.len(), "Predicted grade");

    Ok(GradePrediction {
        enrollment_id,
        features,
        predicted,
        sample_count: samples.len(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{grades, payment},
        entities::AttendanceStatus,
        test_utils::*,
    };
    use ndarray::array;
    use rust_decimal_macros::dec;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_recovers_known_coefficients() {
        // y = 10 + 30·attendance + 1.5·hours + 0.4·previous − 2·delays
        let x = array![
            [0.50, 4.0, 60.0, 0.0],
            [0.90, 10.0, 75.0, 1.0],
            [0.75, 2.0, 90.0, 3.0],
            [1.00, 15.0, 55.0, 0.0],
            [0.60, 8.0, 80.0, 4.0],
            [0.85, 12.0, 70.0, 2.0],
        ];
        let y = x.map_axis(Axis(1), |row| {
            10.0 + 30.0 * row[0] + 1.5 * row[1] + 0.4 * row[2] - 2.0 * row[3]
        });

        let model = GradePredictor::fit(&x, &y).unwrap();
        assert!(close(model.intercept(), 10.0));
        let expected = [30.0, 1.5, 0.4, -2.0];
        for (got, want) in model.coefficients().iter().zip(expected) {
            assert!(close(*got, want), "{got} != {want}");
        }
        assert!(close(model.predict(&[0.8, 5.0, 70.0, 1.0]).unwrap(), 67.5));
    }

    #[test]
    fn test_predictions_are_clamped() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 60.0, 120.0];
        let model = GradePredictor::fit(&x, &y).unwrap();
        assert!(close(model.predict(&[10.0]).unwrap(), 100.0));
        assert!(close(model.predict(&[-10.0]).unwrap(), 0.0));
    }

    #[test]
    fn test_fit_errors() {
        let y = array![1.0, 2.0, 3.0];

        let empty = Array2::<f64>::zeros((3, 0));
        assert_eq!(
            GradePredictor::fit(&empty, &y),
            Err(PredictorError::FeatureCount { got: 0 })
        );

        let wide = Array2::<f64>::zeros((3, 5));
        assert_eq!(
            GradePredictor::fit(&wide, &y),
            Err(PredictorError::FeatureCount { got: 5 })
        );

        let short = array![[1.0], [2.0]];
        assert_eq!(
            GradePredictor::fit(&short, &y),
            Err(PredictorError::DimensionMismatch { expected: 2, got: 3 })
        );

        let two_features = array![[1.0, 2.0], [2.0, 1.0], [3.0, 5.0]];
        assert!(GradePredictor::fit(&two_features, &y).is_ok());
        let too_few = array![[1.0, 2.0], [2.0, 1.0]];
        assert_eq!(
            GradePredictor::fit(&too_few, &array![1.0, 2.0]),
            Err(PredictorError::TooFewSamples { needed: 3, got: 2 })
        );
    }

    #[test]
    fn test_collinear_features_are_singular() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(GradePredictor::fit(&x, &y), Err(PredictorError::SingularSystem));

        let constant = array![[5.0], [5.0], [5.0]];
        assert_eq!(
            GradePredictor::fit(&constant, &array![1.0, 2.0, 3.0]),
            Err(PredictorError::SingularSystem)
        );
    }

    #[test]
    fn test_fit_rows_rejects_ragged_input() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            GradePredictor::fit_rows(&rows, &[1.0, 2.0]),
            Err(PredictorError::DimensionMismatch { expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_predict_wrong_width() {
        let model = GradePredictor::fit(&array![[0.0], [1.0]], &array![1.0, 2.0]).unwrap();
        assert_eq!(
            model.predict(&[1.0, 2.0]),
            Err(PredictorError::DimensionMismatch { expected: 1, got: 2 })
        );
    }

    #[tokio::test]
    async fn test_predict_enrollment_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let course = create_test_course(&db, &owner, "Physics").await?;

        // grade = 50 + 40·rate − 0.1·balance
        // (present days, absent days, paid, grade)
        let plans = [
            (1, 0, dec!(0), Some(dec!(80))),
            (1, 1, dec!(0), Some(dec!(60))),
            (1, 0, dec!(100), Some(dec!(90))),
            (1, 1, dec!(100), Some(dec!(70))),
            (0, 1, dec!(50), None),
        ];

        let mut target = None;
        for (i, (present, absent, paid, grade)) in plans.into_iter().enumerate() {
            let student =
                create_test_student(&db, &owner, &format!("Student{i}"), "Physics").await?;
            let created = enrollment::enroll_students_on(
                &db,
                &owner,
                course.id,
                &[student.id],
                test_date(1),
            )
            .await?;
            let enrollment_id = created[0].id;

            let mut day = 2;
            let statuses = [
                (present, AttendanceStatus::Present),
                (absent, AttendanceStatus::Absent),
            ];
            for (count, status) in statuses {
                for _ in 0..count {
                    attendance::mark_attendance(
                        &db,
                        &owner,
                        course.id,
                        student.id,
                        test_date(day),
                        status,
                    )
                    .await?;
                    day += 1;
                }
            }
            if !paid.is_zero() {
                payment::record_payment(&db, &owner, student.id, paid, test_date(3), None).await?;
            }
            match grade {
                Some(grade) => {
                    grades::record_score(
                        &db,
                        &owner,
                        enrollment_id,
                        "Final".to_string(),
                        grade,
                        dec!(100),
                        test_date(20),
                    )
                    .await?;
                }
                None => target = Some(enrollment_id),
            }
        }

        let target = target.unwrap();
        let samples = build_training_set(&db, &owner, Some(target)).await?;
        assert_eq!(samples.len(), 4);

        let prediction = predict_enrollment(&db, &owner, target).await?;
        assert_eq!(prediction.sample_count, 4);
        assert_eq!(prediction.features.len(), OBSERVED_FEATURES.len());
        assert!(close(prediction.features[0], 0.0));
        assert!(close(prediction.features[1], 50.0));
        assert!(close(prediction.predicted, 45.0), "{}", prediction.predicted);

        Ok(())
    }

    #[tokio::test]
    async fn test_predict_without_training_data() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let (_, enrollment) = setup_enrolled_student(&db, &owner).await?;

        let result = predict_enrollment(&db, &owner, enrollment.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Prediction(PredictorError::TooFewSamples { got: 0, .. })
        ));

        let foreign = predict_enrollment(&db, &other_owner(), enrollment.id).await;
        assert!(matches!(foreign.unwrap_err(), Error::EnrollmentNotFound { .. }));

        Ok(())
    }
}
