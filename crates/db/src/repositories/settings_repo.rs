//! Repository for the `app_settings` key/value table.

use mdrrmo_core::settings::SettingChange;
use sqlx::PgPool;

use crate::models::setting::AppSetting;

/// Provides read and batch-write operations for application settings.
pub struct SettingsRepo;

impl SettingsRepo {
    /// All settings ordered by key.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AppSetting>, sqlx::Error> {
        sqlx::query_as::<_, AppSetting>(
            "SELECT key, value, updated_at FROM app_settings ORDER BY key",
        )
        .fetch_all(pool)
        .await
    }

    /// Apply a batch of validated changes atomically.
    pub async fn apply(pool: &PgPool, changes: &[SettingChange]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for change in changes {
            match change {
                SettingChange::Upsert { key, value } => {
                    sqlx::query(
                        "INSERT INTO app_settings (key, value, updated_at)
                         VALUES ($1, $2, NOW())
                         ON CONFLICT (key) DO UPDATE SET
                            value = EXCLUDED.value,
                            updated_at = NOW()",
                    )
                    .bind(key)
                    .bind(value)
                    .execute(&mut *tx)
                    .await?;
                }
                SettingChange::Delete { key } => {
                    sqlx::query("DELETE FROM app_settings WHERE key = $1")
                        .bind(key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
