use std::collections::BTreeMap;

use crate::core::{
    scoring::{
        base_city_score, demographic_score, interest_score, pacing_score, timeline_score,
        FULL_SCORE,
    },
    timeline::calculate_timeline_overlap,
};
use crate::models::{CompatibilityScore, CompatibilityWeights, TravelerProfile, Trip};

const EXCELLENT_TIMELINE_THRESHOLD: f64 = 0.8;
const SIMILAR_INTERESTS_THRESHOLD: f64 = 0.7;
const PACING_WARNING_THRESHOLD: f64 = 0.5;
const COMPATIBLE_DEMOGRAPHICS_THRESHOLD: f64 = 0.8;

pub const TIMELINE_KEY: &str = "timeline";
pub const INTERESTS_KEY: &str = "interests";
pub const PACING_KEY: &str = "pacing";
pub const DEMOGRAPHICS_KEY: &str = "demographics";
pub const BASE_CITY_KEY: &str = "baseCity";

/// Calculate the compatibility between two travelers and their trips
///
/// Scoring formula:
/// score = (
///     timeline_score * 0.25 +      # Doubled overlap fraction, capped
///     interest_score * 0.30 +      # Jaccard of trip categories
///     pacing_score * 0.20 +        # Pacing compatibility matrix
///     demographic_score * 0.15 +   # Shared language + nationality
///     base_city_score * 0.10       # Same starting city
/// )
///
/// Callers are expected to have filtered out pairs without any date overlap.
pub fn calculate_compatibility(
    trip1: &Trip,
    trip2: &Trip,
    profile1: &TravelerProfile,
    profile2: &TravelerProfile,
    flexibility_days: u32,
) -> CompatibilityScore {
    let weights = CompatibilityWeights::STANDARD;
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();

    let overlap = calculate_timeline_overlap(trip1, trip2, flexibility_days);
    let timeline = timeline_score(&overlap);
    if timeline > EXCELLENT_TIMELINE_THRESHOLD {
        reasons.push(format!(
            "Excellent timeline overlap ({}%)",
            (timeline * 100.0).round() as i64
        ));
    }

    let interests = interest_score(trip1, trip2);
    if interests > SIMILAR_INTERESTS_THRESHOLD {
        reasons.push("Similar travel interests".to_string());
    }

    let pacing = pacing_score(trip1.pacing, trip2.pacing);
    if pacing < PACING_WARNING_THRESHOLD {
        warnings.push("Different travel pacing preferences".to_string());
    }

    let demographics = demographic_score(profile1, profile2);
    if demographics > COMPATIBLE_DEMOGRAPHICS_THRESHOLD {
        reasons.push("Compatible demographics".to_string());
    }

    let base_city = base_city_score(trip1, trip2);
    if base_city == FULL_SCORE {
        reasons.push("Same starting city".to_string());
    }

    let overall_score = timeline * weights.timeline
        + interests * weights.interests
        + pacing * weights.pacing
        + demographics * weights.demographics
        + base_city * weights.base_city;

    let detailed_scores = BTreeMap::from([
        (TIMELINE_KEY.to_string(), timeline),
        (INTERESTS_KEY.to_string(), interests),
        (PACING_KEY.to_string(), pacing),
        (DEMOGRAPHICS_KEY.to_string(), demographics),
        (BASE_CITY_KEY.to_string(), base_city),
    ]);

    CompatibilityScore {
        user_id_1: trip1.user_id.clone(),
        user_id_2: trip2.user_id.clone(),
        overall_score,
        timeline_compatibility: timeline,
        interest_compatibility: interests,
        pacing_compatibility: pacing,
        demographic_compatibility: demographics,
        base_city_compatibility: base_city,
        detailed_scores,
        compatibility_reasons: reasons,
        incompatibility_warnings: warnings,
        score_weights: weights.as_map(),
    }
}
