//! Admission checks for student records.

use crate::core::student::NewStudent;
use serde::{Deserialize, Serialize};

/// A student record submitted for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Operator-assigned student code
    #[serde(default)]
    pub student_code: Option<String>,
    /// Contact address
    #[serde(default)]
    pub email: Option<String>,
}

impl From<&NewStudent> for StudentRecord {
    fn from(student: &NewStudent) -> Self {
        Self {
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            student_code: student.student_code.clone(),
            email: student.email.clone(),
        }
    }
}

/// Verdict for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the record may be admitted
    pub validation_ok: bool,
    /// Why the record was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Confirmation for an accepted record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationOutcome {
    fn passed() -> Self {
        Self {
            validation_ok: true,
            error: None,
            message: Some("Student data passed all external validation checks.".to_string()),
        }
    }

    fn rejected(error: String) -> Self {
        Self {
            validation_ok: false,
            error: Some(error),
            message: None,
        }
    }
}

/// Loose shape check: one `@`, a non-empty local part, a dotted domain, no spaces.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Checks one record against the reserved codes and basic field rules.
#[must_use]
pub fn validate_record(record: &StudentRecord, reserved_codes: &[String]) -> ValidationOutcome {
    if let Some(code) = record
        .student_code
        .as_deref()
        .map(str::trim)
        .filter(|code| reserved_codes.iter().any(|reserved| reserved == code))
    {
        return ValidationOutcome::rejected(format!(
            "Student ID '{code}' is reserved for administration."
        ));
    }

    if record.first_name.trim().is_empty() || record.last_name.trim().is_empty() {
        return ValidationOutcome::rejected("First and last name are required.".to_string());
    }

    if let Some(email) = record
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty() && !looks_like_email(email))
    {
        return ValidationOutcome::rejected(format!("'{email}' is not a valid email address."));
    }

    ValidationOutcome::passed()
}

/// One outcome per record, in input order.
#[must_use]
pub fn validate_batch(records: &[StudentRecord], reserved_codes: &[String]) -> Vec<ValidationOutcome> {
    records
        .iter()
        .map(|record| validate_record(record, reserved_codes))
        .collect()
}
