//! Domain rules for the MDRRMO incident-response backend.
//!
//! This crate has no I/O. Everything here is shared by the repository layer
//! and the HTTP handlers: identifiers, the error taxonomy, field validation,
//! the alert status machine, responder-tracking geometry, the PCR narrative
//! template, and CSV encoding for exports.

pub mod alert;
pub mod csv;
pub mod error;
pub mod notification;
pub mod pcr;
pub mod roles;
pub mod security;
pub mod settings;
pub mod tracking;
pub mod types;
pub mod validation;
