//! Application settings keys.
//!
//! Settings are a flat key/value table of public URLs shown in the
//! dashboard and the resident app. Only the keys below may be written.

use crate::error::CoreError;

pub const HOTLINE_URL: &str = "hotline_url";
pub const FACEBOOK_URL: &str = "facebook_url";
pub const WEBSITE_URL: &str = "website_url";
pub const MAP_TILES_URL: &str = "map_tiles_url";
pub const MOBILE_APP_URL: &str = "mobile_app_url";

pub const SETTING_KEYS: &[&str] = &[
    HOTLINE_URL,
    FACEBOOK_URL,
    WEBSITE_URL,
    MAP_TILES_URL,
    MOBILE_APP_URL,
];

/// Maximum stored length of a setting value.
pub const MAX_VALUE_LEN: usize = 2048;

/// Outcome of validating one submitted setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingChange {
    Upsert { key: String, value: String },
    Delete { key: String },
}

/// Validate a submitted key/value pair. A blank value means "remove".
pub fn validate_setting(key: &str, value: &str) -> Result<SettingChange, CoreError> {
    if !SETTING_KEYS.contains(&key) {
        return Err(CoreError::Validation(format!(
            "Unknown setting '{key}'. Allowed: {}",
            SETTING_KEYS.join(", ")
        )));
    }

    let value = value.trim();
    if value.is_empty() {
        return Ok(SettingChange::Delete {
            key: key.to_string(),
        });
    }
    if value.len() > MAX_VALUE_LEN {
        return Err(CoreError::Validation(format!(
            "Setting '{key}' exceeds {MAX_VALUE_LEN} characters"
        )));
    }
    let has_scheme = value.starts_with("https://") || value.starts_with("http://");
    if !has_scheme || value.contains(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "Setting '{key}' must be an http(s) URL"
        )));
    }

    Ok(SettingChange::Upsert {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_https_url() {
        assert_eq!(
            validate_setting(WEBSITE_URL, " https://mdrrmo.example.gov.ph ").unwrap(),
            SettingChange::Upsert {
                key: WEBSITE_URL.to_string(),
                value: "https://mdrrmo.example.gov.ph".to_string(),
            }
        );
    }

    #[test]
    fn blank_value_deletes() {
        assert_matches!(
            validate_setting(FACEBOOK_URL, "  "),
            Ok(SettingChange::Delete { .. })
        );
    }

    #[test]
    fn rejects_unknown_key_and_bad_url() {
        assert!(validate_setting("db_password", "x").is_err());
        assert!(validate_setting(HOTLINE_URL, "javascript:alert(1)").is_err());
        assert!(validate_setting(HOTLINE_URL, "https://a b").is_err());
    }
}
