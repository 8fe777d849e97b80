//! Account kinds and admin role names.
//!
//! The three account kinds live in separate tables with the same shape.
//! The string forms are what the `notifications.account_type` column and the
//! JWT `account_type` claim carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Full administrator: may manage co-admins.
pub const ROLE_ADMIN: &str = "admin";
/// Co-administrator: dashboard access without admin management.
pub const ROLE_CO_ADMIN: &str = "co-admin";

/// Roles accepted for rows in the `admins` table.
pub const ADMIN_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CO_ADMIN];

/// The kind of account a token or notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Admin,
    Responder,
    Resident,
}

impl AccountType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Responder => "responder",
            Self::Resident => "resident",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "responder" => Ok(Self::Responder),
            "resident" | "user" => Ok(Self::Resident),
            other => Err(CoreError::Validation(format!(
                "Unknown account type '{other}'"
            ))),
        }
    }
}

/// Validate an admin role against [`ADMIN_ROLES`].
pub fn validate_admin_role(role: &str) -> Result<(), CoreError> {
    if ADMIN_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Role must be one of: {}",
            ADMIN_ROLES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_type_round_trips_through_str() {
        for kind in [AccountType::Admin, AccountType::Responder, AccountType::Resident] {
            assert_eq!(kind.as_str().parse::<AccountType>().unwrap(), kind);
        }
    }

    #[test]
    fn legacy_user_alias_maps_to_resident() {
        assert_eq!("user".parse::<AccountType>().unwrap(), AccountType::Resident);
    }

    #[test]
    fn unknown_account_type_is_rejected() {
        assert!("dispatcher".parse::<AccountType>().is_err());
    }

    #[test]
    fn admin_role_whitelist() {
        assert!(validate_admin_role("admin").is_ok());
        assert!(validate_admin_role("co-admin").is_ok());
        assert!(validate_admin_role("superuser").is_err());
        assert!(validate_admin_role("").is_err());
    }
}
