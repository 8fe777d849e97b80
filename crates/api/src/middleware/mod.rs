//! Authentication and authorization extractors.
//!
//! - [`auth::AdminUser`] -- admin or co-admin from the `auth` cookie.
//! - [`auth::ResponderUser`] -- responder from the `responderToken` cookie.
//! - [`auth::ResidentUser`] -- resident from the `residentToken` cookie.
//! - [`auth::Actor`] -- admin or responder, whichever cookie is present.
//! - [`rbac::CronOrAdmin`] -- `x-cron-secret` header or an admin cookie.

pub mod auth;
pub mod rbac;
