//! Great-circle distance and delivery-time estimates.
//!
//! Distances stay numeric (`f64` kilometres) everywhere; the `format_*`
//! helpers exist only for display boundaries.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed handling time before a rider leaves the pharmacy.
pub const BASE_HANDLING_MINUTES: f64 = 5.0;
pub const MINUTES_PER_KM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between `a` and `b` in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// `round(5 + distance_km * 3)` minutes.
///
/// Surface distances top out near 20,000 km, so the result always fits in a
/// `u32` and is never negative.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_delivery_minutes(distance_km: f64) -> u32 {
    (BASE_HANDLING_MINUTES + distance_km.max(0.0) * MINUTES_PER_KM).round() as u32
}

/// `"X.X km"`.
#[must_use]
pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km:.1} km")
}

/// `"N min"`.
#[must_use]
pub fn format_delivery_time(minutes: u32) -> String {
    format!("{minutes} min")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const CONNAUGHT_PLACE: GeoPoint = GeoPoint::new(28.6139, 77.2090);
    const KAROL_BAGH: GeoPoint = GeoPoint::new(28.6519, 77.1909);

    #[test]
    fn same_point_is_zero_km() {
        assert!(haversine_km(CONNAUGHT_PLACE, CONNAUGHT_PLACE).abs() < f64::EPSILON);
    }

    #[test]
    fn connaught_place_to_karol_bagh_is_about_four_and_a_half_km() {
        let d = haversine_km(CONNAUGHT_PLACE, KAROL_BAGH);
        assert!((4.0..5.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn delivery_estimate_is_base_plus_three_minutes_per_km() {
        assert_eq!(estimate_delivery_minutes(0.0), 5);
        assert_eq!(estimate_delivery_minutes(1.0), 8);
        assert_eq!(estimate_delivery_minutes(2.5), 13);
        // 5 + 0.3 * 3 = 5.9 → 6
        assert_eq!(estimate_delivery_minutes(0.3), 6);
    }

    #[test]
    fn display_helpers_format_one_decimal_and_minutes() {
        assert_eq!(format_distance(0.0), "0.0 km");
        assert_eq!(format_distance(4.449), "4.4 km");
        assert_eq!(format_delivery_time(5), "5 min");
    }

    fn coordinate() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
    }

    proptest! {
        /// Distance does not depend on direction of travel.
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }

        /// A point is zero kilometres from itself.
        #[test]
        fn distance_to_self_is_zero(p in coordinate()) {
            prop_assert!(haversine_km(p, p).abs() < 1e-9);
        }

        /// Distance is never negative and never exceeds half the circumference.
        #[test]
        fn distance_is_bounded(a in coordinate(), b in coordinate()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
