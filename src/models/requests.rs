use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::models::domain::{TravelerProfile, Trip};

/// Request to rank candidate trips against a target trip, with all trip
/// and profile data supplied inline
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindTimelineMatchesRequest {
    #[serde(rename = "targetTrip")]
    pub target_trip: Trip,
    #[serde(rename = "targetProfile")]
    pub target_profile: TravelerProfile,
    #[serde(rename = "candidateTrips", default)]
    pub candidate_trips: Vec<Trip>,
    #[serde(rename = "candidateProfiles", default)]
    pub candidate_profiles: HashMap<String, TravelerProfile>,
    #[validate(range(max = 30))]
    #[serde(rename = "flexibilityDays", default)]
    pub flexibility_days: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(rename = "minCompatibilityScore", default)]
    pub min_compatibility_score: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
}

/// Request to score a single pair of trips
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompatibilityRequest {
    pub trip1: Trip,
    pub trip2: Trip,
    pub profile1: TravelerProfile,
    pub profile2: TravelerProfile,
    #[validate(range(max = 30))]
    #[serde(rename = "flexibilityDays", default)]
    pub flexibility_days: Option<u32>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
}

/// Request to find pools for a stored trip
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PoolingRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "trip_id", rename = "tripId")]
    pub trip_id: String,
    #[validate(range(max = 30))]
    #[serde(rename = "dateFlexibilityDays", default)]
    pub date_flexibility_days: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(rename = "minCompatibilityScore", default)]
    pub min_compatibility_score: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistanceKm", default)]
    pub max_distance_km: Option<f64>,
}

/// Request to create a new pool around the user's trip
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePoolRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "trip_id", rename = "tripId")]
    pub trip_id: String,
    #[validate(length(min = 1, max = 120))]
    #[serde(rename = "poolName", default)]
    pub pool_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to join an existing pool
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinPoolRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "trip_id", rename = "tripId")]
    pub trip_id: String,
}

/// Request to leave a pool
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeavePoolRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Query for listing a user's pools
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserPoolsQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}
