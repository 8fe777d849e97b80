//! Field-level validation shared by every account and alert handler.
//!
//! Each validator returns the normalised value on success so callers store
//! exactly what was checked.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum length for person and place names.
pub const MAX_NAME_LEN: usize = 120;

/// Minimum password length for any account.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Local mobile format after normalisation: `09` followed by nine digits.
static LOCAL_MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{9}$").expect("valid regex"));

/// International mobile format: `+639` / `639` followed by nine digits.
static INTL_MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?639(\d{9})$").expect("valid regex"));

/// Trim and lower-case an email address, rejecting malformed ones.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if !normalized.validate_email() {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{normalized}'"
        )));
    }
    Ok(normalized)
}

/// Normalise a Philippine mobile number to the `09XXXXXXXXX` form.
///
/// Spaces, dashes, dots and parentheses are ignored. Both the local form and
/// the `+63` international form are accepted.
pub fn normalize_contact(contact: &str) -> Result<String, CoreError> {
    let digits: String = contact
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if LOCAL_MOBILE_RE.is_match(&digits) {
        return Ok(digits);
    }
    if let Some(caps) = INTL_MOBILE_RE.captures(&digits) {
        return Ok(format!("09{}", &caps[1]));
    }
    Err(CoreError::Validation(format!(
        "Invalid contact number '{contact}'. Expected 09XXXXXXXXX or +639XXXXXXXXX"
    )))
}

/// Trim a required name field and enforce its length bound.
pub fn validate_name(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A date of birth may not lie after `today`.
pub fn validate_dob(dob: NaiveDate, today: NaiveDate) -> Result<NaiveDate, CoreError> {
    if dob > today {
        return Err(CoreError::Validation(
            "Date of birth cannot be in the future".into(),
        ));
    }
    Ok(dob)
}

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Check a WGS84 coordinate pair.
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), CoreError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(CoreError::Validation(format!(
            "Latitude {lat} is outside [-90, 90]"
        )));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(CoreError::Validation(format!(
            "Longitude {lng} is outside [-180, 180]"
        )));
    }
    Ok(())
}

/// Trim an optional free-text field; blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
