// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CompatibilityScore, CompatibilityWeights, MemberRole, MemberStatus, Pacing, PlannedPlace,
    PoolMember, PoolStatus, PoolSuggestion, TimelineOverlap, TravelerProfile, Trip, TripPool,
    TripPoolMatch,
};
pub use requests::{
    CompatibilityRequest, CreatePoolRequest, FindTimelineMatchesRequest, JoinPoolRequest,
    LeavePoolRequest, PoolingRequest, UserPoolsQuery,
};
pub use responses::{
    CompatibilityResponse, ErrorResponse, FindTimelineMatchesResponse, HealthResponse,
    LeavePoolResponse, PoolSuggestionsResponse,
};
