use std::collections::HashSet;

use crate::core::{distance::place_distance, scoring::jaccard_similarity};
use crate::models::{PlannedPlace, Trip};

/// Route score when there isn't enough place data to compare
pub const NEUTRAL_ROUTE_SCORE: f64 = 0.3;

const CITY_OVERLAP_WEIGHT: f64 = 0.7;
const PROXIMITY_WEIGHT: f64 = 0.3;

/// Calculate route similarity between two trips from their planned places
///
/// Blends the Jaccard overlap of the visited cities (case-insensitive) with
/// the fraction of place pairs lying within `max_distance_km` of each other:
///
/// score = city_overlap * 0.7 + proximity * 0.3
///
/// Trips without planned places on either side score a neutral 0.3. This
/// value is informational and does not feed the overall compatibility score.
pub fn calculate_route_compatibility(trip1: &Trip, trip2: &Trip, max_distance_km: f64) -> f64 {
    let places1 = trip1.planned_places();
    let places2 = trip2.planned_places();

    if places1.is_empty() || places2.is_empty() {
        return NEUTRAL_ROUTE_SCORE;
    }

    let cities1 = normalized_cities(places1);
    let cities2 = normalized_cities(places2);

    if cities1.is_empty() && cities2.is_empty() {
        return NEUTRAL_ROUTE_SCORE;
    }

    let city_overlap = jaccard_similarity(
        cities1.iter().map(String::as_str),
        cities2.iter().map(String::as_str),
    );
    let proximity = place_proximity_score(places1, places2, max_distance_km);

    city_overlap * CITY_OVERLAP_WEIGHT + proximity * PROXIMITY_WEIGHT
}

/// Fraction (0-1) of all cross pairs of places that are within
/// `max_distance_km` of each other
pub fn place_proximity_score(
    places1: &[PlannedPlace],
    places2: &[PlannedPlace],
    max_distance_km: f64,
) -> f64 {
    if places1.is_empty() || places2.is_empty() {
        return 0.0;
    }

    let nearby_pairs = places1
        .iter()
        .flat_map(|a| places2.iter().map(move |b| place_distance(a, b)))
        .filter(|distance| *distance <= max_distance_km)
        .count();

    let total_pairs = places1.len() * places2.len();
    nearby_pairs as f64 / total_pairs as f64
}

/// Distinct lower-cased city names of the given places
pub fn normalized_cities(places: &[PlannedPlace]) -> HashSet<String> {
    places.iter().map(|p| p.city.to_lowercase()).collect()
}

/// Cities visited on both trips, in the first trip's spelling and order
pub fn shared_cities(trip1: &Trip, trip2: &Trip) -> Vec<String> {
    let other = normalized_cities(trip2.planned_places());
    let mut seen = HashSet::new();

    trip1
        .planned_places()
        .iter()
        .filter(|p| other.contains(&p.city.to_lowercase()))
        .filter(|p| seen.insert(p.city.to_lowercase()))
        .map(|p| p.city.clone())
        .collect()
}
