//! Tenant scoping.
//!
//! Every database-facing function in `core` takes an [`OwnerId`]. There is no
//! unscoped variant, so a query cannot be written that forgets to filter by owner.

use crate::errors::{Error, Result};
use std::fmt;

/// Identifier of the operator who owns a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wraps a raw owner id.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an empty or blank id.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::Validation {
                message: "Owner id cannot be empty".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// The raw id as stored in `owner_id` columns.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_owner_id_rejects_blank() {
        assert!(matches!(OwnerId::new(""), Err(Error::Validation { .. })));
        assert!(matches!(OwnerId::new("   "), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_owner_id_round_trips() {
        let owner = OwnerId::new("4242").unwrap();
        assert_eq!(owner.as_str(), "4242");
        assert_eq!(owner.to_string(), "4242");
    }
}
