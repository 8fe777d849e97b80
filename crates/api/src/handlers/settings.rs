//! Public application settings (hotline, social and map URLs).

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use mdrrmo_core::security::event_types;
use mdrrmo_core::settings::{validate_setting, SettingChange};
use mdrrmo_db::repositories::SettingsRepo;
use serde_json::json;

use crate::audit::{self, SecurityEvent};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminUser;
use crate::response::DataResponse;
use crate::state::AppState;

type SettingsMap = BTreeMap<String, String>;

async fn current(state: &AppState) -> AppResult<SettingsMap> {
    Ok(SettingsRepo::list_all(&state.pool)
        .await?
        .into_iter()
        .map(|s| (s.key, s.value))
        .collect())
}

/// Validate a submitted batch. `null` and blank values delete the key.
pub fn validate_changes(
    input: &BTreeMap<String, Option<String>>,
) -> AppResult<Vec<SettingChange>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No settings provided".into()));
    }
    input
        .iter()
        .map(|(key, value)| {
            validate_setting(key, value.as_deref().unwrap_or("")).map_err(AppError::from)
        })
        .collect()
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<DataResponse<SettingsMap>>> {
    Ok(Json(DataResponse {
        data: current(&state).await?,
    }))
}

/// PUT /api/settings
///
/// Applies the whole batch or nothing, then returns the full map.
pub async fn update_settings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    Json(input): Json<BTreeMap<String, Option<String>>>,
) -> AppResult<Json<DataResponse<SettingsMap>>> {
    let changes = validate_changes(&input)?;
    SettingsRepo::apply(&state.pool, &changes).await?;

    let keys: Vec<&String> = input.keys().collect();
    tracing::info!(admin_id = admin.id, ?keys, "Settings updated");
    audit::record(
        &state.pool,
        Some(&headers),
        SecurityEvent {
            event_type: event_types::SETTINGS_UPDATED,
            email: None,
            details: json!({ "keys": keys, "by_admin_id": admin.id }),
        },
    )
    .await;

    Ok(Json(DataResponse {
        data: current(&state).await?,
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use mdrrmo_core::error::CoreError;

    use super::*;

    #[test]
    fn null_and_blank_delete() {
        let input = BTreeMap::from([
            ("facebook_url".to_string(), None),
            ("website_url".to_string(), Some("https://mdrrmo.example.ph".to_string())),
        ]);
        let changes = validate_changes(&input).unwrap();
        assert_matches!(&changes[0], SettingChange::Delete { key } if key == "facebook_url");
        assert_matches!(&changes[1], SettingChange::Upsert { key, .. } if key == "website_url");
    }

    #[test]
    fn empty_batch_rejected() {
        assert_matches!(validate_changes(&BTreeMap::new()), Err(AppError::BadRequest(_)));
    }

    #[test]
    fn one_bad_key_rejects_batch() {
        let input = BTreeMap::from([
            ("website_url".to_string(), Some("https://ok.example".to_string())),
            ("smtp_password".to_string(), Some("x".to_string())),
        ]);
        assert_matches!(
            validate_changes(&input),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
