//! Read-only access to the municipality and barangay lookup tables.

use mdrrmo_core::types::DbId;
use sqlx::PgPool;

use crate::models::address::{Barangay, Municipality};

pub struct AddressRepo;

impl AddressRepo {
    /// All municipalities ordered by name.
    pub async fn list_municipalities(pool: &PgPool) -> Result<Vec<Municipality>, sqlx::Error> {
        sqlx::query_as::<_, Municipality>(
            "SELECT id, name, province FROM municipalities ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn municipality_exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM municipalities WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Barangays of one municipality ordered by name.
    pub async fn list_barangays(
        pool: &PgPool,
        municipality_id: DbId,
    ) -> Result<Vec<Barangay>, sqlx::Error> {
        sqlx::query_as::<_, Barangay>(
            "SELECT id, municipality_id, name FROM barangays
             WHERE municipality_id = $1
             ORDER BY name",
        )
        .bind(municipality_id)
        .fetch_all(pool)
        .await
    }
}
