//! Session tokens.
//!
//! HS256 JWTs carried in per-account-type cookies. Every token names the
//! table its subject lives in, so a responder token can never be replayed
//! against the admin cookie.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mdrrmo_core::roles::AccountType;
use mdrrmo_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim on every token this server mints.
pub const ISSUER: &str = "mdrrmo-api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id within `account_type`'s table.
    pub sub: DbId,
    pub account_type: AccountType,
    /// `admin` or `co-admin` for admins, the account type otherwise.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id, recorded in security logs.
    pub jti: String,
}

impl Claims {
    /// Claims for a token issued now and valid for `ttl`.
    pub fn issue(account_type: AccountType, sub: DbId, role: &str, ttl: Duration) -> Self {
        let issued = Utc::now();
        Self {
            sub,
            account_type,
            role: role.to_owned(),
            iss: ISSUER.to_owned(),
            exp: (issued + ttl).timestamp(),
            iat: issued.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    fn ttl(&self) -> Duration {
        Duration::hours(self.expiry_hours)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation
    }
}

/// Sign a token for `account_id` in `account_type`'s table.
pub fn generate_token(
    account_type: AccountType,
    account_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::issue(account_type, account_id, role, config.ttl());
    let key = EncodingKey::from_secret(config.secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key)
}

/// Verify signature, issuer and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<Claims>(token, &key, &JwtConfig::validation()).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_owned(),
            expiry_hours: 8,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_decodes_to_same_account() {
        let cfg = config("responder-signing-secret");
        let token = generate_token(AccountType::Responder, 17, "responder", &cfg).unwrap();

        let claims = validate_token(&token, &cfg).unwrap();
        assert_eq!(claims.sub, 17);
        assert_eq!(claims.account_type, AccountType::Responder);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn each_token_gets_its_own_jti() {
        let a = Claims::issue(AccountType::Admin, 1, "admin", Duration::hours(1));
        let b = Claims::issue(AccountType::Admin, 1, "admin", Duration::hours(1));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config("admin-signing-secret");
        // Past the library's default 60 second leeway.
        let claims = Claims::issue(AccountType::Admin, 1, "admin", Duration::minutes(-10));
        assert!(validate_token(&sign(&claims, &cfg.secret), &cfg).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let cfg = config("admin-signing-secret");
        let mut claims = Claims::issue(AccountType::Admin, 1, "admin", Duration::hours(1));
        claims.iss = "someone-else".to_owned();
        assert!(validate_token(&sign(&claims, &cfg.secret), &cfg).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(AccountType::Resident, 3, "resident", &config("one")).unwrap();
        assert!(validate_token(&token, &config("two")).is_err());
    }
}
