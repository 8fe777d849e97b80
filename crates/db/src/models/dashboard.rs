//! Dashboard summary figures.

use serde::Serialize;

use super::alert::AlertStatusCount;

/// Headline counts for the dashboard landing page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub alerts_by_status: Vec<AlertStatusCount>,
    pub alerts_last_24h: i64,
    pub active_responders: i64,
    pub total_responders: i64,
    pub total_residents: i64,
}
