//! Linear trend forecasting over monthly revenue.
//!
//! Fits `y = m·x + b` by ordinary least squares over the positions `1..=n` of
//! a series and extrapolates one step forward. The forecast is floored at zero.

use crate::{
    core::{payment, tenant::OwnerId},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;
use std::fmt;

/// A fitted line over series positions starting at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    /// Change per step
    pub slope: f64,
    /// Value at position 0
    pub intercept: f64,
}

impl TrendLine {
    /// Value of the line at position `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// Total payments received in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RevenuePoint {
    /// Calendar year
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Sum of payments dated in this month
    pub total: Decimal,
}

impl fmt::Display for RevenuePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Monthly revenue with the projection for the following month.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueForecast {
    /// Observed months, oldest first
    pub series: Vec<RevenuePoint>,
    /// Fitted trend, `None` for an empty series
    pub trend: Option<TrendLine>,
    /// Projected revenue for the month after the last observed one
    pub next_month: f64,
}

/// Fits the least-squares line through `(i + 1, series[i])`.
///
/// An empty series has no line. A single point gives a flat line through it.
pub fn fit_trend(series: &[f64]) -> Option<TrendLine> {
    match series {
        [] => None,
        [only] => Some(TrendLine {
            slope: 0.0,
            intercept: *only,
        }),
        _ => {
            #[allow(clippy::cast_precision_loss)] // series lengths are small
            let n = series.len() as f64;
            let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
            for (i, &y) in series.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let x = (i + 1) as f64;
                sum_x += x;
                sum_y += y;
                sum_xy += x * y;
                sum_xx += x * x;
            }

            let denominator = n.mul_add(sum_xx, -(sum_x * sum_x));
            if denominator == 0.0 {
                return Some(TrendLine {
                    slope: 0.0,
                    intercept: sum_y / n,
                });
            }

            let slope = n.mul_add(sum_xy, -(sum_x * sum_y)) / denominator;
            let intercept = slope.mul_add(-sum_x, sum_y) / n;
            Some(TrendLine { slope, intercept })
        }
    }
}

/// One-step-ahead forecast, never negative. An empty series forecasts 0.
pub fn forecast_next(series: &[f64]) -> f64 {
    fit_trend(series).map_or(0.0, |line| {
        #[allow(clippy::cast_precision_loss)]
        let next_x = (series.len() + 1) as f64;
        line.at(next_x).max(0.0)
    })
}

/// Groups dated amounts into calendar months.
///
/// Months between the first and last payment with no payments appear with a
/// zero total, so every position in the series is one month apart.
pub fn monthly_revenue<I>(payments: I) -> Vec<RevenuePoint>
where
    I: IntoIterator<Item = (NaiveDate, Decimal)>,
{
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for (date, amount) in payments {
        *by_month.entry((date.year(), date.month())).or_default() += amount;
    }

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let (mut year, mut month) = first;
    loop {
        series.push(RevenuePoint {
            year,
            month,
            total: by_month.get(&(year, month)).copied().unwrap_or_default(),
        });
        if (year, month) == last {
            break;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    series
}

/// Keeps only the last `window` points; a window of 0 keeps everything.
#[must_use]
pub fn trailing(series: &[RevenuePoint], window: usize) -> &[RevenuePoint] {
    if window == 0 || series.len() <= window {
        series
    } else {
        &series[series.len() - window..]
    }
}

/// Builds a forecast from a monthly series.
#[must_use]
pub fn forecast_series(series: Vec<RevenuePoint>) -> RevenueForecast {
    let values: Vec<f64> = series
        .iter()
        .map(|p| p.total.to_f64().unwrap_or_default())
        .collect();

    RevenueForecast {
        trend: fit_trend(&values),
        next_month: forecast_next(&values),
        series,
    }
}

/// Monthly revenue of the owner, oldest first.
pub async fn get_monthly_revenue(
    db: &DatabaseConnection,
    owner: &OwnerId,
) -> Result<Vec<RevenuePoint>> {
    let payments = payment::get_all_payments(db, owner).await?;
    Ok(monthly_revenue(
        payments.into_iter().map(|p| (p.payment_date, p.amount)),
    ))
}

/// Projects next month's revenue from the trailing `window` months.
pub async fn forecast_revenue(
    db: &DatabaseConnection,
    owner: &OwnerId,
    window: usize,
) -> Result<RevenueForecast> {
    let series = get_monthly_revenue(db, owner).await?;
    Ok(forecast_series(trailing(&series, window).to_vec()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_empty_series_forecasts_zero() {
        assert_eq!(fit_trend(&[]), None);
        assert_eq!(forecast_next(&[]), 0.0);
    }

    #[test]
    fn test_single_point_is_flat() {
        assert_eq!(forecast_next(&[42.0]), 42.0);
        let line = fit_trend(&[42.0]).unwrap();
        assert_eq!(line.slope, 0.0);
    }

    #[test]
    fn test_linear_series() {
        let line = fit_trend(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(line.slope, 10.0);
        assert_eq!(line.intercept, 0.0);
        assert_eq!(forecast_next(&[10.0, 20.0, 30.0]), 40.0);
    }

    #[test]
    fn test_declining_series_is_floored_at_zero() {
        assert_eq!(forecast_next(&[300.0, 200.0, 100.0]), 0.0);
    }

    #[test]
    fn test_noisy_series_fit() {
        // x: 1..4, y: 2, 4, 5, 8 -> slope 1.9, intercept 0
        let line = fit_trend(&[2.0, 4.0, 5.0, 8.0]).unwrap();
        assert!((line.slope - 1.9).abs() < 1e-9);
        assert!(line.intercept.abs() < 1e-9);
        assert!((forecast_next(&[2.0, 4.0, 5.0, 8.0]) - 9.5).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_is_bit_identical_across_calls() {
        let series = [1234.56, 987.65, 1500.0, 1710.25, 1699.99];
        let first = forecast_next(&series);
        let second = forecast_next(&series);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_monthly_revenue_fills_gaps() {
        let series = monthly_revenue([
            (ymd(2024, 11, 3), dec!(100)),
            (ymd(2025, 2, 14), dec!(50)),
            (ymd(2024, 11, 20), dec!(25.50)),
        ]);

        let labels: Vec<String> = series.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(series[0].total, dec!(125.50));
        assert_eq!(series[1].total, Decimal::ZERO);
        assert_eq!(series[2].total, Decimal::ZERO);
        assert_eq!(series[3].total, dec!(50));
    }

    #[test]
    fn test_monthly_revenue_empty() {
        assert!(monthly_revenue(Vec::new()).is_empty());
    }

    #[test]
    fn test_trailing_window() {
        let series = monthly_revenue([(ymd(2025, 1, 1), dec!(1)), (ymd(2025, 6, 1), dec!(6))]);
        assert_eq!(series.len(), 6);
        assert_eq!(trailing(&series, 0).len(), 6);
        assert_eq!(trailing(&series, 10).len(), 6);
        let last_two = trailing(&series, 2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[1].total, dec!(6));
    }

    #[tokio::test]
    async fn test_forecast_revenue_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = test_owner();
        let student = create_test_student(&db, &owner, "Mary", "Somerville").await?;

        for (month, amount) in [(1, dec!(100)), (2, dec!(200)), (3, dec!(300))] {
            payment::record_payment(&db, &owner, student.id, amount, ymd(2025, month, 15), None)
                .await?;
        }

        let forecast = forecast_revenue(&db, &owner, 12).await?;
        assert_eq!(forecast.series.len(), 3);
        assert_eq!(forecast.next_month, 400.0);
        assert_eq!(forecast.trend.unwrap().slope, 100.0);

        let empty = forecast_revenue(&db, &other_owner(), 12).await?;
        assert!(empty.series.is_empty());
        assert_eq!(empty.next_month, 0.0);

        Ok(())
    }
}
