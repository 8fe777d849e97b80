//! Notification sender kinds and message rules.
//!
//! Chat messages share the notifications table; they are told apart by
//! `sender_type = 'chat'`.

use crate::error::CoreError;
use crate::roles::AccountType;

/// Sent by the system (assignment, new alert).
pub const SENDER_SYSTEM: &str = "system";
/// Sent manually by an admin from the dashboard.
pub const SENDER_ADMIN: &str = "admin";
/// A chat message between two accounts.
pub const SENDER_CHAT: &str = "chat";

/// Maximum message length, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Trim a message body and enforce `1..=MAX_MESSAGE_LEN` characters.
pub fn validate_message(message: &str) -> Result<String, CoreError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Message cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Only admins and responders have an inbox. Residents sign in to the
/// reporting app, which has no notification or chat view.
pub fn validate_recipient(account_type: AccountType) -> Result<(), CoreError> {
    match account_type {
        AccountType::Admin | AccountType::Responder => Ok(()),
        AccountType::Resident => Err(CoreError::Validation(
            "Residents cannot receive messages".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_trimmed() {
        assert_eq!(validate_message("  on the way  ").unwrap(), "on the way");
    }

    #[test]
    fn residents_have_no_inbox() {
        assert!(validate_recipient(AccountType::Admin).is_ok());
        assert!(validate_recipient(AccountType::Responder).is_ok());
        assert!(validate_recipient(AccountType::Resident).is_err());
    }

    #[test]
    fn message_bounds() {
        assert!(validate_message(" \n ").is_err());
        assert!(validate_message(&"a".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(validate_message(&"a".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }
}
