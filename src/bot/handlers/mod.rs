//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete
//! and other non-command interactions.

/// Autocomplete handlers for course names, students and status values
pub mod autocomplete;
