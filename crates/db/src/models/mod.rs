//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` create / update DTOs where the table is written by handlers
//! - Query-parameter structs for filtered listings

pub mod account;
pub mod address;
pub mod alert;
pub mod dashboard;
pub mod notification;
pub mod pcr_form;
pub mod responder_session;
pub mod security_log;
pub mod setting;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 50;
/// Upper bound for any list query.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a caller-supplied limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Negative offsets are treated as zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// `ILIKE` pattern matching `term` anywhere, for use with `ESCAPE '\'`.
///
/// Wildcards typed by the caller match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wildcards_are_escaped() {
        assert_eq!(contains_pattern("dela cruz"), "%dela cruz%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_offset(Some(-5)), 0);
    }
}
