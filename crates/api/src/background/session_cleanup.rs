//! Periodic deactivation of stale responder sessions.
//!
//! A responder whose app stops pinging (battery, no signal, app killed)
//! would otherwise stay "live" on the dispatcher's map. This job marks
//! every session not seen within the activity window offline. The same
//! sweep is exposed at `POST /api/responders/sessions/cleanup` for external
//! schedulers.

use std::time::Duration;

use chrono::Utc;
use mdrrmo_core::security::event_types;
use mdrrmo_core::tracking::active_cutoff;
use mdrrmo_db::repositories::ResponderSessionRepo;
use serde_json::json;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::audit::{self, SecurityEvent};

/// Mark sessions idle for longer than `window_secs` offline.
///
/// Returns the number of sessions deactivated.
pub async fn sweep_stale_sessions(pool: &PgPool, window_secs: i64) -> Result<u64, sqlx::Error> {
    let cutoff = active_cutoff(Utc::now(), window_secs);
    let deactivated = ResponderSessionRepo::deactivate_stale(pool, cutoff).await?;
    if deactivated > 0 {
        tracing::info!(deactivated, %cutoff, "Stale responder sessions deactivated");
    }
    Ok(deactivated)
}

/// Run the cleanup loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, window_secs: i64, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        window_secs,
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sweep_stale_sessions(&pool, window_secs).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to deactivate"),
                    Ok(deactivated) => {
                        audit::record(
                            &pool,
                            None,
                            SecurityEvent {
                                event_type: event_types::SESSION_CLEANUP,
                                email: None,
                                details: json!({
                                    "deactivated": deactivated,
                                    "caller": { "trigger": "scheduler" },
                                }),
                            },
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup: sweep failed");
                    }
                }
            }
        }
    }
}
