//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Dashboard, forecast, risk and prediction commands
pub mod analytics;

/// Course catalog commands
pub mod course;

/// General utility commands
pub mod general;

/// Payment commands
pub mod ledger;

/// Attendance and grading commands
pub mod records;

/// Enrollment commands
pub mod roster;

/// Student roster commands
pub mod student;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use analytics::*;
pub use course::*;
pub use general::*;
pub use ledger::*;
pub use records::*;
pub use roster::*;
pub use student::*;

/// Every top-level command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        course(),
        student(),
        enroll(),
        unenroll(),
        pay(),
        attend(),
        grade(),
        analytics(),
        risk(),
        predict(),
    ]
}
