//! Property tests for the geofence distance math

use proptest::prelude::*;
use KarmaHub::models::GeoPoint;

fn point() -> impl Strategy<Value = GeoPoint> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(latitude, longitude)| GeoPoint { latitude, longitude })
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in point(), b in point()) {
        let ab = a.distance_meters(&b);
        let ba = b.distance_meters(&a);
        prop_assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn distance_is_bounded(a in point(), b in point()) {
        let d = a.distance_meters(&b);
        prop_assert!(d >= 0.0);
        // half the earth's circumference
        prop_assert!(d <= 20_015_100.0);
    }

    #[test]
    fn distance_to_self_is_zero(a in point()) {
        prop_assert!(a.distance_meters(&a) < 1e-6);
    }
}

#[test]
fn known_distance_between_landmarks() {
    // Bengaluru MG Road to Cubbon Park, roughly 1.3 km
    let mg_road = GeoPoint { latitude: 12.9756, longitude: 77.6066 };
    let cubbon = GeoPoint { latitude: 12.9763, longitude: 77.5929 };
    let d = mg_road.distance_meters(&cubbon);
    assert!((1400.0..1600.0).contains(&d), "distance was {}", d);
}
