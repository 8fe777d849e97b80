//! Responder location fixes and route-progress figures.
//!
//! The dashboard polls responder sessions and draws a marker plus a route to
//! the assigned alert. The numbers it shows next to the marker (distance to
//! destination, rough arrival time) are computed here from the latest fix.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;
use crate::validation::validate_coordinates;

/// Mean Earth radius in metres (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Below this speed (m/s) a responder is treated as stationary and no ETA
/// is reported.
pub const MIN_MOVING_SPEED_MPS: f64 = 0.5;

/// Default window after the last ping during which a session counts as live.
pub const DEFAULT_ACTIVE_WINDOW_SECS: i64 = 300;

/// Session status while no alert is assigned.
pub const SESSION_AVAILABLE: &str = "available";
/// Session status while travelling to an assigned alert.
pub const SESSION_EN_ROUTE: &str = "en_route";
/// Session status after logout or cleanup.
pub const SESSION_OFFLINE: &str = "offline";

/// A single GPS fix reported by a responder device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lng: f64,
    /// Degrees clockwise from north.
    pub heading: Option<f64>,
    /// Metres per second.
    pub speed: Option<f64>,
    /// Horizontal accuracy radius in metres.
    pub accuracy: Option<f64>,
}

impl LocationFix {
    /// Validate ranges and normalise the heading into `[0, 360)`.
    pub fn validated(self) -> Result<Self, CoreError> {
        validate_coordinates(self.lat, self.lng)?;

        let heading = match self.heading {
            Some(h) if !h.is_finite() => {
                return Err(CoreError::Validation("Heading must be a finite number".into()))
            }
            Some(h) => Some(normalize_heading(h)),
            None => None,
        };

        if let Some(speed) = self.speed {
            if !speed.is_finite() || speed < 0.0 {
                return Err(CoreError::Validation(
                    "Speed must be a non-negative number".into(),
                ));
            }
        }
        if let Some(accuracy) = self.accuracy {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(CoreError::Validation(
                    "Accuracy must be a non-negative number".into(),
                ));
            }
        }

        Ok(Self { heading, ..self })
    }
}

/// Wrap any heading into `[0, 360)`.
pub fn normalize_heading(heading: f64) -> f64 {
    let wrapped = heading.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Great-circle distance between two WGS84 points, in metres.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Seconds to cover `distance_m` at `speed_mps`, or `None` when stationary.
pub fn eta_seconds(distance_m: f64, speed_mps: Option<f64>) -> Option<i64> {
    let speed = speed_mps.filter(|s| s.is_finite() && *s >= MIN_MOVING_SPEED_MPS)?;
    Some((distance_m / speed).round() as i64)
}

/// Distance and ETA from the current position to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteProgress {
    pub distance_to_destination_m: f64,
    pub eta_seconds: Option<i64>,
}

/// Compute route progress when both the current position and the
/// destination are known.
pub fn route_progress(
    current: Option<(f64, f64)>,
    destination: Option<(f64, f64)>,
    speed_mps: Option<f64>,
) -> Option<RouteProgress> {
    let (lat, lng) = current?;
    let (dest_lat, dest_lng) = destination?;
    let distance = haversine_m(lat, lng, dest_lat, dest_lng);
    Some(RouteProgress {
        distance_to_destination_m: distance,
        eta_seconds: eta_seconds(distance, speed_mps),
    })
}

/// The oldest `last_active_at` still considered live at `now`.
pub fn active_cutoff(now: Timestamp, window_secs: i64) -> Timestamp {
    now - Duration::seconds(window_secs)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fix(lat: f64, lng: f64) -> LocationFix {
        LocationFix {
            lat,
            lng,
            heading: None,
            speed: None,
            accuracy: None,
        }
    }

    #[test]
    fn heading_is_wrapped() {
        assert_eq!(normalize_heading(370.0), 10.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(0.0), 0.0);
        assert!(normalize_heading(-1e-20) < 360.0);
    }

    #[test]
    fn fix_validation_normalises_heading() {
        let validated = LocationFix {
            heading: Some(-45.0),
            ..fix(14.6, 121.0)
        }
        .validated()
        .unwrap();
        assert_eq!(validated.heading, Some(315.0));
    }

    #[test]
    fn fix_validation_rejects_negative_speed() {
        let result = LocationFix {
            speed: Some(-1.0),
            ..fix(14.6, 121.0)
        }
        .validated();
        assert!(result.is_err());
    }

    #[test]
    fn fix_validation_rejects_bad_coordinates() {
        assert!(fix(91.0, 0.0).validated().is_err());
    }

    #[test]
    fn haversine_known_distance() {
        // One degree of latitude is roughly 111.2 km.
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert_eq!(haversine_m(14.6, 121.0, 14.6, 121.0), 0.0);
    }

    #[test]
    fn eta_requires_movement() {
        assert_eq!(eta_seconds(1000.0, Some(10.0)), Some(100));
        assert_eq!(eta_seconds(1000.0, Some(0.1)), None);
        assert_eq!(eta_seconds(1000.0, None), None);
    }

    #[test]
    fn route_progress_needs_both_points() {
        assert!(route_progress(Some((14.6, 121.0)), None, Some(5.0)).is_none());
        assert!(route_progress(None, Some((14.6, 121.0)), Some(5.0)).is_none());

        let progress = route_progress(Some((0.0, 0.0)), Some((0.0, 0.01)), Some(10.0)).unwrap();
        assert!(progress.distance_to_destination_m > 1000.0);
        assert!(progress.eta_seconds.unwrap() > 100);
    }

    #[test]
    fn activity_window() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let cutoff = active_cutoff(now, DEFAULT_ACTIVE_WINDOW_SECS);
        assert_eq!(cutoff, now - Duration::minutes(5));
        // Live sessions are strictly newer than the cutoff.
        assert!(now - Duration::minutes(4) > cutoff);
        assert!(now - Duration::minutes(6) < cutoff);
    }
}
