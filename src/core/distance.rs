use crate::models::PlannedPlace;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers. NaN inputs propagate as NaN.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two planned places in kilometers
#[inline]
pub fn place_distance(a: &PlannedPlace, b: &PlannedPlace) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Colombo to Kandy (approximately 94 km as the crow flies)
        let colombo_lat = 6.9271;
        let colombo_lon = 79.8612;
        let kandy_lat = 7.2906;
        let kandy_lon = 80.6337;

        let distance = haversine_distance(colombo_lat, colombo_lon, kandy_lat, kandy_lon);
        assert!((distance - 94.0).abs() < 5.0, "Distance should be ~94km, got {}", distance);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let there = haversine_distance(6.9271, 79.8612, 6.0535, 80.2210);
        let back = haversine_distance(6.0535, 80.2210, 6.9271, 79.8612);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(haversine_distance(f64::NAN, 79.8612, 6.0535, 80.2210).is_nan());
    }

    #[test]
    fn test_place_distance() {
        let galle_fort = PlannedPlace {
            place_id: None,
            name: Some("Galle Fort".to_string()),
            city: "Galle".to_string(),
            latitude: 6.0267,
            longitude: 80.2170,
        };
        let unawatuna = PlannedPlace {
            place_id: None,
            name: Some("Unawatuna Beach".to_string()),
            city: "Unawatuna".to_string(),
            latitude: 6.0097,
            longitude: 80.2490,
        };

        let distance = place_distance(&galle_fort, &unawatuna);
        assert!(distance > 2.0 && distance < 6.0, "got {}", distance);
    }
}
