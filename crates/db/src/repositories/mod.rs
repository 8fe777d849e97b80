//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod account_repo;
pub mod address_repo;
pub mod alert_repo;
pub mod dashboard_repo;
pub mod notification_repo;
pub mod pcr_form_repo;
pub mod responder_session_repo;
pub mod security_log_repo;
pub mod settings_repo;

pub use account_repo::AccountRepo;
pub use address_repo::AddressRepo;
pub use alert_repo::{AlertRepo, AssignOutcome};
pub use dashboard_repo::DashboardRepo;
pub use notification_repo::NotificationRepo;
pub use pcr_form_repo::PcrFormRepo;
pub use responder_session_repo::ResponderSessionRepo;
pub use security_log_repo::SecurityLogRepo;
pub use settings_repo::SettingsRepo;
