// Core algorithm exports
pub mod compatibility;
pub mod distance;
pub mod matcher;
pub mod pools;
pub mod route;
pub mod scoring;
pub mod timeline;

pub use compatibility::calculate_compatibility;
pub use distance::{haversine_distance, place_distance};
pub use matcher::{MatchingConfig, PoolMatcher};
pub use route::{calculate_route_compatibility, place_proximity_score};
pub use scoring::{
    base_city_score, demographic_score, interest_score, jaccard_similarity, pacing_score,
    timeline_score,
};
pub use timeline::{calculate_timeline_overlap, flexed_range, inclusive_days};
