pub mod accounts;
pub mod address;
pub mod alerts;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod notifications;
pub mod pcr;
pub mod security_logs;
pub mod settings;
pub mod tracking;
pub mod uploads;
