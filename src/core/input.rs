//! Parsing of operator-typed values.
//!
//! Amounts and scores arrive as text from the bot. They are parsed into exact
//! decimals here and rejected with a validation error when they are not
//! numbers; nothing is coerced to zero.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a decimal number, accepting a leading currency sign and thousands separators.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    let (negative, rest) = trimmed
        .strip_prefix('-')
        .map_or((false, trimmed), |rest| (true, rest));
    let cleaned: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err(Error::Validation {
            message: format!("'{input}' is not a number"),
        });
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| Error::Validation {
        message: format!("'{input}' is not a number"),
    })?;
    Ok(if negative { -value } else { value })
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| Error::Validation {
        message: format!("'{input}' is not a date, expected YYYY-MM-DD"),
    })
}

/// The operator's calendar day, used wherever a date defaults to "today".
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parses an optional date, falling back to `default` when none was given.
pub fn parse_date_or(input: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => parse_date(text),
        None => Ok(default),
    }
}
