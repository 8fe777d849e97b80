//! Patient care report models.

use chrono::NaiveDate;
use mdrrmo_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `pcr_forms`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PcrForm {
    pub id: DbId,
    pub patient_name: String,
    #[serde(rename = "date")]
    pub incident_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub recorder: Option<String>,
    pub full_form: serde_json::Value,
    pub created_by_type: String,
    pub created_by_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a PCR form.
#[derive(Debug, Clone)]
pub struct CreatePcrForm {
    pub patient_name: String,
    pub incident_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub recorder: Option<String>,
    pub full_form: serde_json::Value,
    pub created_by_type: String,
    pub created_by_id: DbId,
}

/// DTO for updating a PCR form. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdatePcrForm {
    pub patient_name: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub recorder: Option<String>,
    pub full_form: Option<serde_json::Value>,
}

/// Filter parameters for PCR listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PcrQuery {
    /// Case-insensitive match on patient name, location or recorder.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated PCR listing.
#[derive(Debug, Serialize)]
pub struct PcrPage {
    pub items: Vec<PcrForm>,
    pub total: i64,
}
