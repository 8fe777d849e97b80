//! Aggregate queries for the dashboard landing page.

use chrono::Duration;
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;
use crate::repositories::{AccountRepo, AlertRepo, ResponderSessionRepo};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Collect the headline counts. `active_cutoff` is the oldest
    /// `last_active_at` that still counts as a live responder.
    pub async fn stats(
        pool: &PgPool,
        now: Timestamp,
        active_cutoff: Timestamp,
    ) -> Result<DashboardStats, sqlx::Error> {
        let (
            alerts_by_status,
            alerts_last_24h,
            active_responders,
            total_responders,
            total_residents,
        ) = tokio::try_join!(
            AlertRepo::status_counts(pool),
            AlertRepo::count_since(pool, now - Duration::hours(24)),
            ResponderSessionRepo::count_active(pool, active_cutoff),
            AccountRepo::count_all(pool, AccountType::Responder),
            AccountRepo::count_all(pool, AccountType::Resident),
        )?;

        Ok(DashboardStats {
            alerts_by_status,
            alerts_last_24h,
            active_responders,
            total_responders,
            total_residents,
        })
    }
}
