//! Alert status machine and severity vocabulary.
//!
//! Alert rows store status and severity as text so the dashboard can display
//! them verbatim. Handlers parse through [`AlertStatus`] and [`Severity`]
//! before writing, which keeps the stored values inside the vocabulary below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle of an accident alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    #[serde(rename = "Not Responded")]
    NotResponded,
    #[serde(rename = "Ongoing")]
    Ongoing,
    #[serde(rename = "Responded")]
    Responded,
    #[serde(rename = "False Alarm")]
    FalseAlarm,
}

impl AlertStatus {
    pub const ALL: [Self; 4] = [
        Self::NotResponded,
        Self::Ongoing,
        Self::Responded,
        Self::FalseAlarm,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotResponded => "Not Responded",
            Self::Ongoing => "Ongoing",
            Self::Responded => "Responded",
            Self::FalseAlarm => "False Alarm",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Responded | Self::FalseAlarm)
    }

    /// Whether the alert may move from `self` to `next`.
    ///
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        match self {
            Self::NotResponded => matches!(
                next,
                Self::Ongoing | Self::Responded | Self::FalseAlarm
            ),
            Self::Ongoing => matches!(
                next,
                Self::Responded | Self::FalseAlarm | Self::NotResponded
            ),
            Self::Responded | Self::FalseAlarm => false,
        }
    }

    /// Validate a transition, producing a readable error when it is illegal.
    pub fn transition_to(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Validation(format!(
                "Cannot change alert status from '{self}' to '{next}'"
            )))
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = CoreError;

    /// Case-insensitive; underscores and hyphens count as spaces so that
    /// `not_responded` and `Not Responded` are the same status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "not responded" | "pending" => Ok(Self::NotResponded),
            "ongoing" | "in progress" => Ok(Self::Ongoing),
            "responded" | "resolved" => Ok(Self::Responded),
            "false alarm" => Ok(Self::FalseAlarm),
            _ => Err(CoreError::Validation(format!("Unknown alert status '{s}'"))),
        }
    }
}

/// Alert severity as set by dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(CoreError::Validation(format!(
                "Severity must be one of: low, medium, high, critical (got '{s}')"
            ))),
        }
    }
}

/// Default severity for alerts created without one.
pub const DEFAULT_SEVERITY: Severity = Severity::Medium;

/// Maximum length of the free-form alert type label.
pub const MAX_ALERT_TYPE_LEN: usize = 60;

/// Trim and bound the alert type label (`Fire`, `Flood`, `Medical`, ...).
pub fn validate_alert_type(alert_type: &str) -> Result<String, CoreError> {
    let trimmed = alert_type.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Alert type is required".into()));
    }
    if trimmed.chars().count() > MAX_ALERT_TYPE_LEN {
        return Err(CoreError::Validation(format!(
            "Alert type must be at most {MAX_ALERT_TYPE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_parsing_is_lenient() {
        assert_eq!("Not Responded".parse::<AlertStatus>().unwrap(), AlertStatus::NotResponded);
        assert_eq!("not_responded".parse::<AlertStatus>().unwrap(), AlertStatus::NotResponded);
        assert_eq!("ONGOING".parse::<AlertStatus>().unwrap(), AlertStatus::Ongoing);
        assert_eq!("false-alarm".parse::<AlertStatus>().unwrap(), AlertStatus::FalseAlarm);
        assert!("closed".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn status_display_matches_stored_text() {
        for status in AlertStatus::ALL {
            assert_eq!(status.as_str().parse::<AlertStatus>().unwrap(), status);
        }
    }

    #[test]
    fn forward_transitions_allowed() {
        assert!(AlertStatus::NotResponded.can_transition_to(AlertStatus::Ongoing));
        assert!(AlertStatus::Ongoing.can_transition_to(AlertStatus::Responded));
        assert!(AlertStatus::NotResponded.can_transition_to(AlertStatus::FalseAlarm));
    }

    #[test]
    fn unassign_returns_to_not_responded() {
        assert!(AlertStatus::Ongoing.can_transition_to(AlertStatus::NotResponded));
    }

    #[test]
    fn terminal_statuses_are_final() {
        assert!(AlertStatus::Responded.is_terminal());
        assert_matches!(
            AlertStatus::Responded.transition_to(AlertStatus::Ongoing),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            AlertStatus::FalseAlarm.transition_to(AlertStatus::NotResponded),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn same_status_is_a_no_op() {
        assert_eq!(
            AlertStatus::Responded.transition_to(AlertStatus::Responded).unwrap(),
            AlertStatus::Responded
        );
    }

    #[test]
    fn severity_whitelist() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert!("urgent".parse::<Severity>().is_err());
        assert!(Severity::Critical > Severity::Low);
    }

    #[test]
    fn alert_type_bounds() {
        assert_eq!(validate_alert_type("  Fire ").unwrap(), "Fire");
        assert!(validate_alert_type("").is_err());
        assert!(validate_alert_type(&"a".repeat(61)).is_err());
    }
}
