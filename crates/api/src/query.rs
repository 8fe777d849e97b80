//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?search=&limit=&offset=` for account and PCR listings.
///
/// `limit` and `offset` are clamped in the repository layer.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// The search term, or `None` when blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
