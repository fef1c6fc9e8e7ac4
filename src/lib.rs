//! IslandHop pooling - trip companion matching service
//!
//! This library scores how well two travelers' trips fit together (dates,
//! interests, pacing, demographics, starting city and route proximity) and
//! manages the pools travelers form from the best matches.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    calculate_compatibility, calculate_route_compatibility, calculate_timeline_overlap,
    haversine_distance, MatchingConfig, PoolMatcher,
};
pub use error::PoolingError;
pub use models::{
    CompatibilityScore, Pacing, PlannedPlace, TimelineOverlap, TravelerProfile, Trip,
    TripPoolMatch,
};
