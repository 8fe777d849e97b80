//! Auth cookie names and builders.
//!
//! Each account type has its own cookie so a browser can hold an admin and
//! a responder session side by side.

use axum_extra::extract::cookie::{Cookie, SameSite};
use mdrrmo_core::roles::AccountType;

/// Admins and co-admins.
pub const ADMIN_COOKIE: &str = "auth";
pub const RESPONDER_COOKIE: &str = "responderToken";
pub const RESIDENT_COOKIE: &str = "residentToken";

/// The cookie that carries tokens for `account_type`.
pub const fn cookie_name(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Admin => ADMIN_COOKIE,
        AccountType::Responder => RESPONDER_COOKIE,
        AccountType::Resident => RESIDENT_COOKIE,
    }
}

/// HTTP-only session cookie holding `token`.
pub fn session_cookie(name: &'static str, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie matching [`session_cookie`]'s path, for removal from a jar.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie(RESPONDER_COOKIE, "tok".into(), true);
        assert_eq!(cookie.name(), "responderToken");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn cookie_per_account_type() {
        assert_eq!(cookie_name(AccountType::Admin), "auth");
        assert_eq!(cookie_name(AccountType::Resident), "residentToken");
    }
}
