use serde::{Deserialize, Serialize};

use crate::models::domain::{CompatibilityScore, PoolSuggestion, TimelineOverlap, TripPoolMatch};

/// Response for the inline timeline matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindTimelineMatchesResponse {
    pub matches: Vec<TripPoolMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for the pairwise compatibility endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub compatibility: CompatibilityScore,
    #[serde(rename = "timelineOverlap")]
    pub timeline_overlap: TimelineOverlap,
    #[serde(rename = "routeCompatibility")]
    pub route_compatibility: f64,
}

/// Response for the pool suggestion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSuggestionsResponse {
    pub suggestions: Vec<PoolSuggestion>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Leave pool response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeavePoolResponse {
    pub success: bool,
    #[serde(rename = "poolId")]
    pub pool_id: String,
}
