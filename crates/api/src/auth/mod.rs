//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT generation and validation.
//! - [`cookies`] -- the per-account-type auth cookies.

pub mod cookies;
pub mod jwt;
pub mod password;
