use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    compatibility::calculate_compatibility, route::calculate_route_compatibility,
    timeline::calculate_timeline_overlap,
};
use crate::models::{TravelerProfile, Trip, TripPoolMatch};

/// Tunable knobs of the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Days each trip may shift on either side when checking for overlap
    #[serde(rename = "flexibilityDays", default = "default_flexibility_days")]
    pub flexibility_days: u32,
    /// Lowest overall score a candidate needs to be returned
    #[serde(rename = "minCompatibilityScore", default = "default_min_compatibility_score")]
    pub min_compatibility_score: f64,
    /// Radius within which two planned places count as "nearby"
    #[serde(rename = "maxDistanceKm", default = "default_max_distance_km")]
    pub max_distance_km: f64,
}

fn default_flexibility_days() -> u32 {
    2
}

fn default_min_compatibility_score() -> f64 {
    0.6
}

fn default_max_distance_km() -> f64 {
    50.0
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            flexibility_days: default_flexibility_days(),
            min_compatibility_score: default_min_compatibility_score(),
            max_distance_km: default_max_distance_km(),
        }
    }
}

impl MatchingConfig {
    /// Copy of this config with any provided overrides applied
    pub fn with_overrides(
        &self,
        flexibility_days: Option<u32>,
        min_compatibility_score: Option<f64>,
        max_distance_km: Option<f64>,
    ) -> Self {
        Self {
            flexibility_days: flexibility_days.unwrap_or(self.flexibility_days),
            min_compatibility_score: min_compatibility_score
                .unwrap_or(self.min_compatibility_score),
            max_distance_km: max_distance_km.unwrap_or(self.max_distance_km),
        }
    }
}

/// Main matching orchestrator - ranks candidate trips for pooling with a target trip
///
/// # Pipeline Stages
/// 1. Self-match exclusion
/// 2. Timeline overlap filter (at least one shared day after flexibility)
/// 3. Candidate profile lookup
/// 4. Compatibility scoring and threshold
/// 5. Route compatibility and ranking
///
/// The matcher is pure: it only reads its inputs, so one instance can be
/// shared across threads and requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolMatcher {
    config: MatchingConfig,
}

impl PoolMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Find candidate trips that could be pooled with the target trip
    ///
    /// # Arguments
    /// * `target_trip` - The trip to find companions for
    /// * `target_profile` - Profile of the target trip's owner
    /// * `candidates` - Candidate trips from the trip service
    /// * `candidate_profiles` - Candidate owners' profiles keyed by user identifier
    ///
    /// # Returns
    /// Qualifying matches sorted by descending overall score. Ties keep
    /// their input order.
    pub fn find_timeline_matches(
        &self,
        target_trip: &Trip,
        target_profile: &TravelerProfile,
        candidates: &[Trip],
        candidate_profiles: &HashMap<String, TravelerProfile>,
    ) -> Vec<TripPoolMatch> {
        tracing::info!(
            "Finding timeline matches for trip {} with {} candidates",
            target_trip.trip_id,
            candidates.len()
        );

        let mut matches: Vec<TripPoolMatch> = candidates
            .iter()
            // Stage 1: Never match a trip with itself
            .filter(|candidate| candidate.trip_id != target_trip.trip_id)
            // Stage 2: Timeline overlap
            .filter_map(|candidate| {
                let overlap = calculate_timeline_overlap(
                    target_trip,
                    candidate,
                    self.config.flexibility_days,
                );
                (overlap.overlap_days >= 1).then_some((candidate, overlap))
            })
            // Stage 3: Candidate profile
            .filter_map(|(candidate, overlap)| match candidate_profiles.get(&candidate.user_id) {
                Some(profile) => Some((candidate, profile, overlap)),
                None => {
                    tracing::warn!("No profile found for user: {}", candidate.user_id);
                    None
                }
            })
            // Stage 4 & 5: Score, threshold and package
            .filter_map(|(candidate, profile, overlap)| {
                let compatibility = calculate_compatibility(
                    target_trip,
                    candidate,
                    target_profile,
                    profile,
                    self.config.flexibility_days,
                );

                if compatibility.overall_score < self.config.min_compatibility_score {
                    return None;
                }

                tracing::debug!(
                    "Found compatible match: {} with score {:.3}",
                    candidate.trip_id,
                    compatibility.overall_score
                );

                Some(TripPoolMatch {
                    candidate_trip: candidate.clone(),
                    candidate_profile: profile.clone(),
                    timeline_overlap: overlap,
                    compatibility_score: compatibility,
                    route_compatibility: calculate_route_compatibility(
                        target_trip,
                        candidate,
                        self.config.max_distance_km,
                    ),
                })
            })
            .collect();

        // Stable sort keeps input order among equal scores
        matches.sort_by(|a, b| {
            b.overall_score()
                .partial_cmp(&a.overall_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            "Found {} compatible matches for trip {}",
            matches.len(),
            target_trip.trip_id
        );

        matches
    }
}
