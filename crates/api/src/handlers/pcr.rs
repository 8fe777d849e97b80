//! Patient Care Report forms.
//!
//! Admins see every form. Responders see and change only the forms they
//! created; someone else's form is reported as not found.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use mdrrmo_core::error::CoreError;
use mdrrmo_core::pcr::{ai_prompt, template_narrative, validate_full_form};
use mdrrmo_core::types::DbId;
use mdrrmo_core::validation::{optional_text, validate_name};
use mdrrmo_db::models::pcr_form::{CreatePcrForm, PcrForm, PcrPage, PcrQuery, UpdatePcrForm};
use mdrrmo_db::repositories::pcr_form_repo::Owner;
use mdrrmo_db::repositories::PcrFormRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Actor;
use crate::response::DataResponse;
use crate::services::ollama;
use crate::state::AppState;

/// Request body for `POST /api/pcr`.
#[derive(Debug, Deserialize)]
pub struct CreatePcrRequest {
    pub patient_name: String,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub recorder: Option<String>,
    pub full_form: serde_json::Value,
}

/// Request body for `PUT /api/pcr/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePcrRequest {
    pub patient_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub recorder: Option<String>,
    pub full_form: Option<serde_json::Value>,
}

/// Request body for `POST /api/pcr/narrative`.
#[derive(Debug, Deserialize)]
pub struct NarrativeRequest {
    pub full_form: serde_json::Value,
}

/// Where a narrative came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSource {
    Ai,
    Template,
}

#[derive(Debug, Serialize)]
pub struct NarrativeResponse {
    pub narrative: String,
    pub source: NarrativeSource,
}

/// Ownership filter for the caller: none for admins, the caller's own
/// forms for responders.
fn owner_scope(actor: &Actor) -> Owner<'static> {
    if actor.is_admin() {
        None
    } else {
        Some((actor.0.account_type.as_str(), actor.0.id))
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PCR form",
        id,
    })
}

/// GET /api/pcr
pub async fn list_forms(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<PcrQuery>,
) -> AppResult<Json<DataResponse<PcrPage>>> {
    let owner = owner_scope(&actor);
    let (items, total) = tokio::try_join!(
        PcrFormRepo::list(&state.pool, &params, owner),
        PcrFormRepo::count(&state.pool, &params, owner),
    )?;
    Ok(Json(DataResponse {
        data: PcrPage { items, total },
    }))
}

/// GET /api/pcr/{id}
pub async fn get_form(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PcrForm>>> {
    let form = PcrFormRepo::find_by_id(&state.pool, id, owner_scope(&actor))
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/pcr
pub async fn create_form(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreatePcrRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PcrForm>>)> {
    validate_full_form(&input.full_form)?;
    let dto = CreatePcrForm {
        patient_name: validate_name("Patient name", &input.patient_name)?,
        incident_date: input.date,
        location: optional_text(input.location.as_deref()),
        recorder: optional_text(input.recorder.as_deref()),
        full_form: input.full_form,
        created_by_type: actor.0.account_type.as_str().to_string(),
        created_by_id: actor.0.id,
    };

    let form = PcrFormRepo::create(&state.pool, &dto).await?;
    tracing::info!(pcr_id = form.id, created_by = %actor.0.account_type, account_id = actor.0.id, "PCR form created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
}

/// PUT /api/pcr/{id}
pub async fn update_form(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePcrRequest>,
) -> AppResult<Json<DataResponse<PcrForm>>> {
    if let Some(full_form) = &input.full_form {
        validate_full_form(full_form)?;
    }
    let dto = UpdatePcrForm {
        patient_name: input
            .patient_name
            .as_deref()
            .map(|n| validate_name("Patient name", n))
            .transpose()?,
        incident_date: input.date,
        location: optional_text(input.location.as_deref()),
        recorder: optional_text(input.recorder.as_deref()),
        full_form: input.full_form,
    };

    let form = PcrFormRepo::update(&state.pool, id, &dto, owner_scope(&actor))
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: form }))
}

/// DELETE /api/pcr/{id}
pub async fn delete_form(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PcrFormRepo::delete(&state.pool, id, owner_scope(&actor)).await? {
        return Err(not_found(id));
    }
    tracing::info!(pcr_id = id, account_id = actor.0.id, "PCR form deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/pcr/narrative
///
/// Drafts a narrative with the local model when one is configured. Any
/// model failure falls back to the rule-based template, so this endpoint
/// only fails on an invalid form.
pub async fn generate_narrative(
    State(state): State<AppState>,
    _actor: Actor,
    Json(input): Json<NarrativeRequest>,
) -> AppResult<Json<DataResponse<NarrativeResponse>>> {
    let form = validate_full_form(&input.full_form)?;

    if let Some(config) = &state.config.ollama {
        match ollama::generate(&state.http, config, &ai_prompt(form)).await {
            Ok(text) if !text.is_empty() => {
                return Ok(Json(DataResponse {
                    data: NarrativeResponse {
                        narrative: text,
                        source: NarrativeSource::Ai,
                    },
                }));
            }
            Ok(_) => tracing::warn!(model = %config.model, "Model returned an empty narrative"),
            Err(e) => tracing::warn!(error = %e, model = %config.model, "Narrative generation failed"),
        }
    }

    Ok(Json(DataResponse {
        data: NarrativeResponse {
            narrative: template_narrative(form),
            source: NarrativeSource::Template,
        },
    }))
}
