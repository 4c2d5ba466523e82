//! Unified error types for Classbook.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation failures
//! carry enough context for the bot layer to report them back to the operator.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{core::predictor::PredictorError, sidecar::token::TokenError};

/// All errors produced by the core, the sidecar and the bot layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Caller input was rejected before reaching the analytics core
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A monetary amount was outside its allowed range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// No student with this id exists for the owner
    #[error("Student not found: {id}")]
    StudentNotFound {
        /// Student id
        id: i64,
    },

    /// No course with this id or name exists for the owner
    #[error("Course not found: {id}")]
    CourseNotFound {
        /// Course id or name
        id: String,
    },

    /// No enrollment with this id exists for the owner
    #[error("Enrollment not found: {id}")]
    EnrollmentNotFound {
        /// Enrollment id
        id: i64,
    },

    /// Sidecar token problem
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// The grade predictor could not be fitted or applied
    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictorError),

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Environment variable missing or unreadable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting a bot response failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Integer conversion overflowed
    #[error("Integer conversion error: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
