//! Validation sidecar - token-gated admission checks for student records.
//!
//! The sidecar holds the shared secret loaded at startup. Callers obtain a
//! short-lived token for their owner id and present it as a `Bearer` header
//! with each batch; the sidecar verifies it before looking at any record.

/// HS256 token signing and verification
pub mod token;
/// Per-record admission rules
pub mod validate;

use crate::{
    config::app::SidecarSettings,
    core::OwnerId,
    errors::{Error, Result},
};
use std::fmt;
use token::Claims;
use tracing::{debug, warn};
pub use validate::{StudentRecord, ValidationOutcome};

/// Action name carried by tokens for batch validation.
pub const VALIDATE_STUDENTS: &str = "validate_students";

/// The sidecar service with its secret and settings.
pub struct Sidecar {
    secret: Vec<u8>,
    settings: SidecarSettings,
}

impl fmt::Debug for Sidecar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sidecar")
            .field("secret", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl Sidecar {
    /// Creates a sidecar. An empty secret or a non-positive token lifetime is a
    /// configuration error.
    pub fn new(secret: impl Into<Vec<u8>>, settings: SidecarSettings) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::Config {
                message: "Sidecar shared secret cannot be empty".to_string(),
            });
        }
        settings.validate()?;
        Ok(Self { secret, settings })
    }

    /// Settings the sidecar was built with.
    #[must_use]
    pub const fn settings(&self) -> &SidecarSettings {
        &self.settings
    }

    /// Issues a token for `owner` that expires `token_ttl_secs` after `now`.
    pub fn issue_token_at(&self, owner: &OwnerId, action: &str, now: i64) -> Result<String> {
        let exp = now
            .checked_add(self.settings.token_ttl_secs)
            .ok_or_else(|| Error::Config {
                message: format!(
                    "sidecar.token_ttl_secs {} is too large",
                    self.settings.token_ttl_secs
                ),
            })?;
        let claims = Claims {
            owner_id: owner.as_str().to_string(),
            action: action.to_string(),
            exp,
        };
        Ok(token::sign(&claims, &self.secret)?)
    }

    /// Issues a token valid from the current time.
    pub fn issue_token(&self, owner: &OwnerId, action: &str) -> Result<String> {
        self.issue_token_at(owner, action, chrono::Utc::now().timestamp())
    }

    /// Verifies an `Authorization` header value and returns its claims.
    pub fn authorize(&self, authorization: Option<&str>, now: i64) -> Result<Claims> {
        let result = token::parse_bearer(authorization)
            .and_then(|raw| token::verify(raw, &self.secret, now));
        match result {
            Ok(claims) => Ok(claims),
            Err(e) => {
                warn!("Rejected sidecar request: {e}");
                Err(e.into())
            }
        }
    }

    /// Validates a batch at time `now`, one outcome per record.
    pub fn validate_students_at(
        &self,
        authorization: Option<&str>,
        records: &[StudentRecord],
        now: i64,
    ) -> Result<Vec<ValidationOutcome>> {
        let claims = self.authorize(authorization, now)?;
        let outcomes = validate::validate_batch(records, &self.settings.reserved_student_codes);
        debug!(
            owner = %claims.owner_id,
            records = records.len(),
            rejected = outcomes.iter().filter(|o| !o.validation_ok).count(),
            "Validated student batch"
        );
        Ok(outcomes)
    }

    /// Validates a batch against the current time.
    pub fn validate_students(
        &self,
        authorization: Option<&str>,
        records: &[StudentRecord],
    ) -> Result<Vec<ValidationOutcome>> {
        self.validate_students_at(authorization, records, chrono::Utc::now().timestamp())
    }

    /// Issues a token for `owner` and validates a single record with it.
    ///
    /// This is the path the bot takes before creating a student.
    pub fn check_student(&self, owner: &OwnerId, record: StudentRecord) -> Result<ValidationOutcome> {
        let token = self.issue_token(owner, VALIDATE_STUDENTS)?;
        let header = format!("Bearer {token}");
        self.validate_students(Some(&header), &[record])?
            .pop()
            .ok_or_else(|| Error::Validation {
                message: "Sidecar returned no verdict".to_string(),
            })
    }
}
