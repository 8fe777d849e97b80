//! Municipality and barangay lookups for address pickers.

use axum::extract::{Path, State};
use axum::Json;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::types::DbId;
use mdrrmo_db::models::address::{Barangay, Municipality};
use mdrrmo_db::repositories::AddressRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/address/municipalities
pub async fn list_municipalities(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Municipality>>>> {
    let items = AddressRepo::list_municipalities(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/address/municipalities/{id}/barangays
pub async fn list_barangays(
    State(state): State<AppState>,
    Path(municipality_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Barangay>>>> {
    if !AddressRepo::municipality_exists(&state.pool, municipality_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Municipality",
            id: municipality_id,
        }));
    }
    let items = AddressRepo::list_barangays(&state.pool, municipality_id).await?;
    Ok(Json(DataResponse { data: items }))
}
