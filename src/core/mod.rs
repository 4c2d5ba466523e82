//! Core business logic - framework-agnostic roster, ledger and analytics operations.
//!
//! Every function that touches the database takes an [`OwnerId`] and only
//! ever sees that owner's records. The reducers (`ledger::balance`,
//! `attendance::summarize`, `grades::weighted_average`, `forecast::fit_trend`,
//! `risk::score_risk`) are pure and are called after all I/O is done.

pub mod attendance;
pub mod course;
pub mod enrollment;
pub mod forecast;
pub mod grades;
pub mod input;
pub mod ledger;
pub mod payment;
pub mod predictor;
pub mod report;
pub mod risk;
pub mod student;
pub mod tenant;

pub use tenant::OwnerId;
