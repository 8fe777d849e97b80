//! Security log writer.
//!
//! Auth, account and settings handlers record events through [`record`].
//! A failed write is logged and swallowed: the audit trail must never turn
//! a successful request into an error.

use axum::http::HeaderMap;
use mdrrmo_core::security::{default_severity, redact_details};
use mdrrmo_db::models::security_log::CreateSecurityLog;
use mdrrmo_db::repositories::SecurityLogRepo;
use mdrrmo_db::DbPool;

/// Client address from `x-forwarded-for` (first hop), else `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

/// One event to append to `security_logs`.
pub struct SecurityEvent<'a> {
    pub event_type: &'a str,
    pub email: Option<&'a str>,
    pub details: serde_json::Value,
}

/// Append an event with its default severity.
///
/// `headers` supplies the client IP; pass `None` for events raised by
/// background jobs.
pub async fn record(pool: &DbPool, headers: Option<&HeaderMap>, event: SecurityEvent<'_>) {
    let input = CreateSecurityLog {
        event_type: event.event_type.to_string(),
        email: event.email.map(str::to_string),
        ip_address: headers.and_then(client_ip),
        severity: default_severity(event.event_type).to_string(),
        details: Some(redact_details(event.details)),
    };

    if let Err(e) = SecurityLogRepo::create(pool, &input).await {
        tracing::warn!(
            error = %e,
            event_type = event.event_type,
            "Failed to write security log",
        );
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static(" 198.51.100.2 "));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.2"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
