//! Security log vocabulary.
//!
//! Event type and severity strings written to `security_logs`. Handlers use
//! these constants rather than literals so the dashboard filters stay stable.

/// Known event types.
pub mod event_types {
    pub const LOGIN_SUCCESS: &str = "login_success";
    pub const LOGIN_FAILED: &str = "login_failed";
    pub const LOGOUT: &str = "logout";
    pub const UNAUTHORIZED_ACCESS: &str = "unauthorized_access";
    pub const ACCOUNT_CREATED: &str = "account_created";
    pub const ACCOUNT_UPDATED: &str = "account_updated";
    pub const ACCOUNT_DELETED: &str = "account_deleted";
    pub const SETTINGS_UPDATED: &str = "settings_updated";
    pub const SESSION_CLEANUP: &str = "session_cleanup";
}

/// Security log severities, least to most serious.
pub mod severities {
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
    pub const CRITICAL: &str = "critical";

    pub const ALL: &[&str] = &[INFO, WARNING, CRITICAL];
}

/// Whether `severity` is one of [`severities::ALL`].
pub fn is_known_severity(severity: &str) -> bool {
    severities::ALL.contains(&severity)
}

/// Default severity for an event type.
pub fn default_severity(event_type: &str) -> &'static str {
    match event_type {
        event_types::LOGIN_FAILED | event_types::ACCOUNT_DELETED => severities::WARNING,
        event_types::UNAUTHORIZED_ACCESS => severities::CRITICAL,
        _ => severities::INFO,
    }
}

/// Keys removed from `details` before a row is written.
const REDACTED_KEYS: &[&str] = &["password", "password_hash", "token", "api_secret"];

/// Drop credential-bearing keys from a details object (shallow).
pub fn redact_details(details: serde_json::Value) -> serde_json::Value {
    match details {
        serde_json::Value::Object(mut map) => {
            for key in REDACTED_KEYS {
                map.remove(*key);
            }
            serde_json::Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_login_defaults_to_warning() {
        assert_eq!(default_severity(event_types::LOGIN_FAILED), severities::WARNING);
        assert_eq!(default_severity(event_types::LOGIN_SUCCESS), severities::INFO);
        assert_eq!(
            default_severity(event_types::UNAUTHORIZED_ACCESS),
            severities::CRITICAL
        );
    }

    #[test]
    fn severity_whitelist() {
        assert!(is_known_severity("warning"));
        assert!(!is_known_severity("debug"));
    }

    #[test]
    fn credentials_are_redacted() {
        let details = serde_json::json!({
            "account_type": "responder",
            "password": "hunter22",
            "token": "abc",
        });
        let redacted = redact_details(details);
        assert_eq!(redacted, serde_json::json!({ "account_type": "responder" }));
    }
}
