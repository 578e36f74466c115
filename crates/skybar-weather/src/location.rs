//! Movement gating for location updates.
//!
//! Location acquisition itself is an external concern; the agent only
//! decides whether a delivered update moved far enough from the last
//! accepted one to be worth a full refresh.

use crate::types::Location;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Suppresses location updates that moved less than a minimum distance.
///
/// The anchor only advances when an update is accepted, so repeated small
/// steps cannot creep past the threshold unnoticed.
#[derive(Debug)]
pub struct LocationFilter {
    min_distance_meters: f64,
    last: Option<Location>,
}

impl LocationFilter {
    pub fn new(min_distance_meters: f64) -> Self {
        Self {
            min_distance_meters,
            last: None,
        }
    }

    /// Returns true if the update should trigger a refresh.
    /// The first update is always accepted.
    pub fn accept(&mut self, location: &Location) -> bool {
        if let Some(prev) = &self.last {
            if haversine_meters(prev, location) < self.min_distance_meters {
                return false;
            }
        }
        self.last = Some(location.clone());
        true
    }
}

/// Great-circle distance between two coordinates in meters.
pub fn haversine_meters(a: &Location, b: &Location) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_is_accepted() {
        let mut filter = LocationFilter::new(1000.0);
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
    }

    #[test]
    fn test_same_spot_is_rejected() {
        let mut filter = LocationFilter::new(1000.0);
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
        assert!(!filter.accept(&Location::new(47.6062, -122.3321)));
    }

    #[test]
    fn test_small_move_is_rejected_large_move_accepted() {
        let mut filter = LocationFilter::new(1000.0);
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
        // ~550 m north
        assert!(!filter.accept(&Location::new(47.6112, -122.3321)));
        // ~1.1 km north of the original anchor
        assert!(filter.accept(&Location::new(47.6162, -122.3321)));
    }

    #[test]
    fn test_rejection_keeps_anchor() {
        let mut filter = LocationFilter::new(1000.0);
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
        // Two ~550 m steps; the second is past the threshold from the anchor
        assert!(!filter.accept(&Location::new(47.6112, -122.3321)));
        assert!(filter.accept(&Location::new(47.6162, -122.3321)));
    }

    #[test]
    fn test_zero_threshold_accepts_everything() {
        let mut filter = LocationFilter::new(0.0);
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
        assert!(filter.accept(&Location::new(47.6062, -122.3321)));
    }

    #[test]
    fn test_haversine_known_distance() {
        // Seattle to Portland is roughly 233 km
        let seattle = Location::new(47.6062, -122.3321);
        let portland = Location::new(45.5152, -122.6784);
        let distance = haversine_meters(&seattle, &portland);
        assert!((200_000.0..260_000.0).contains(&distance), "{distance}");
    }
}
