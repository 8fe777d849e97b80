//! Address lookup rows.

use mdrrmo_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Municipality {
    pub id: DbId,
    pub name: String,
    pub province: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Barangay {
    pub id: DbId,
    pub municipality_id: DbId,
    pub name: String,
}
