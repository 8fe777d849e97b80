//! Dashboard summary figures.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use mdrrmo_core::tracking::active_cutoff;
use mdrrmo_db::models::dashboard::DashboardStats;
use mdrrmo_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AdminUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let now = Utc::now();
    let cutoff = active_cutoff(now, state.config.session_active_window_secs);
    let stats = DashboardRepo::stats(&state.pool, now, cutoff).await?;
    Ok(Json(DataResponse { data: stats }))
}
