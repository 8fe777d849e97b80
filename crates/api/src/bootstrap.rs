//! First-run provisioning.

use mdrrmo_core::roles::{AccountType, ROLE_ADMIN};
use mdrrmo_core::validation::{normalize_email, validate_password};
use mdrrmo_db::models::account::CreateAccount;
use mdrrmo_db::repositories::AccountRepo;
use mdrrmo_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;

/// Create the first super admin when the `admins` table is empty.
///
/// Returns `true` if an account was created. Does nothing once any admin
/// exists, so the bootstrap variables can stay set across restarts.
pub async fn ensure_super_admin(pool: &DbPool, bootstrap: &BootstrapAdmin) -> anyhow::Result<bool> {
    if AccountRepo::count_all(pool, AccountType::Admin).await? > 0 {
        return Ok(false);
    }

    let email = normalize_email(&bootstrap.email)?;
    validate_password(&bootstrap.password)?;
    let password_hash = hash_password(&bootstrap.password)
        .map_err(|e| anyhow::anyhow!("Password hashing error: {e}"))?;

    let admin = AccountRepo::create(
        pool,
        AccountType::Admin,
        &CreateAccount {
            name: "Administrator".to_string(),
            email,
            dob: None,
            contact: None,
            address: None,
            password_hash,
            role: Some(ROLE_ADMIN.to_string()),
        },
    )
    .await?;

    tracing::info!(admin_id = admin.id, email = %admin.email, "Bootstrap super admin created");
    Ok(true)
}
