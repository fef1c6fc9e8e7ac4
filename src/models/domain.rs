use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Travel intensity preference attached to a trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pacing {
    Relaxed,
    #[default]
    Normal,
    Active,
    /// Any pacing value the trip service sends that we don't know about
    #[serde(other)]
    Unspecified,
}

/// A place planned as part of a trip itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPlace {
    #[serde(rename = "placeId", default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A planned itinerary, as served by the trip-planning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(rename = "tripId")]
    pub trip_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tripName", default)]
    pub trip_name: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "baseCity")]
    pub base_city: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub places: Option<Vec<PlannedPlace>>,
}

impl Trip {
    /// Inclusive number of days covered by the trip
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Planned places, treating an absent list as empty
    pub fn planned_places(&self) -> &[PlannedPlace] {
        self.places.as_deref().unwrap_or(&[])
    }
}

/// Traveler profile, as served by the user service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl TravelerProfile {
    /// Name to show on suggestions, falling back to the identifier
    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.id)
    }
}

/// Date overlap between two trips after widening both by the flexibility window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineOverlap {
    #[serde(rename = "overlapDays")]
    pub overlap_days: u32,
    #[serde(rename = "overlapPercentage")]
    pub overlap_percentage: f64,
    #[serde(rename = "overlapStart")]
    pub overlap_start: NaiveDate,
    #[serde(rename = "overlapEnd")]
    pub overlap_end: NaiveDate,
    #[serde(rename = "flexibilityUsed")]
    pub flexibility_used: u32,
}

impl TimelineOverlap {
    pub fn has_overlap(&self) -> bool {
        self.overlap_days > 0
    }
}

/// Fixed weights for the five compatibility dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompatibilityWeights {
    pub timeline: f64,
    pub interests: f64,
    pub pacing: f64,
    pub demographics: f64,
    pub base_city: f64,
}

impl CompatibilityWeights {
    pub const STANDARD: CompatibilityWeights = CompatibilityWeights {
        timeline: 0.25,
        interests: 0.30,
        pacing: 0.20,
        demographics: 0.15,
        base_city: 0.10,
    };

    pub fn as_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("timeline".to_string(), self.timeline),
            ("interests".to_string(), self.interests),
            ("pacing".to_string(), self.pacing),
            ("demographics".to_string(), self.demographics),
            ("baseCity".to_string(), self.base_city),
        ])
    }
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Weighted compatibility between two travelers' trips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    #[serde(rename = "userId1")]
    pub user_id_1: String,
    #[serde(rename = "userId2")]
    pub user_id_2: String,
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    #[serde(rename = "timelineCompatibility")]
    pub timeline_compatibility: f64,
    #[serde(rename = "interestCompatibility")]
    pub interest_compatibility: f64,
    #[serde(rename = "pacingCompatibility")]
    pub pacing_compatibility: f64,
    #[serde(rename = "demographicCompatibility")]
    pub demographic_compatibility: f64,
    #[serde(rename = "baseCityCompatibility")]
    pub base_city_compatibility: f64,
    #[serde(rename = "detailedScores")]
    pub detailed_scores: BTreeMap<String, f64>,
    #[serde(rename = "compatibilityReasons")]
    pub compatibility_reasons: Vec<String>,
    #[serde(rename = "incompatibilityWarnings")]
    pub incompatibility_warnings: Vec<String>,
    #[serde(rename = "scoreWeights")]
    pub score_weights: BTreeMap<String, f64>,
}

/// A candidate trip that qualified as a pooling match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPoolMatch {
    #[serde(rename = "candidateTrip")]
    pub candidate_trip: Trip,
    #[serde(rename = "candidateProfile")]
    pub candidate_profile: TravelerProfile,
    #[serde(rename = "timelineOverlap")]
    pub timeline_overlap: TimelineOverlap,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: CompatibilityScore,
    #[serde(rename = "routeCompatibility")]
    pub route_compatibility: f64,
}

impl TripPoolMatch {
    pub fn overall_score(&self) -> f64 {
        self.compatibility_score.overall_score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolStatus {
    Forming,
    Active,
    Completed,
    Cancelled,
}

impl PoolStatus {
    /// Forming and active pools still count as "together" for their members
    pub fn is_open(self) -> bool {
        matches!(self, PoolStatus::Forming | PoolStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Creator,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Left,
}

/// Snapshot of a traveler inside a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMember {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tripId")]
    pub trip_id: String,
    #[serde(rename = "tripName", default)]
    pub trip_name: Option<String>,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(rename = "tripCategories", default)]
    pub trip_categories: Vec<String>,
    pub pacing: Pacing,
    pub role: MemberRole,
    pub status: MemberStatus,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

impl PoolMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// A group of travelers sharing part of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPool {
    #[serde(rename = "poolId")]
    pub pool_id: String,
    #[serde(rename = "poolName")]
    pub pool_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: PoolStatus,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "baseCity")]
    pub base_city: String,
    pub members: Vec<PoolMember>,
    #[serde(rename = "createdByUserId")]
    pub created_by_user_id: String,
    #[serde(rename = "maxMembers")]
    pub max_members: u32,
    #[serde(rename = "currentMembers")]
    pub current_members: u32,
    #[serde(rename = "commonInterests", default)]
    pub common_interests: Vec<String>,
    #[serde(rename = "commonCities", default)]
    pub common_cities: Vec<String>,
    #[serde(rename = "averageCompatibilityScore")]
    pub average_compatibility_score: f64,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
    #[serde(rename = "allowJoinRequests")]
    pub allow_join_requests: bool,
    #[serde(rename = "joinCode")]
    pub join_code: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Bumped on every stored change
    #[serde(default)]
    pub version: i64,
}

impl TripPool {
    pub fn is_full(&self) -> bool {
        self.current_members >= self.max_members
    }

    pub fn active_members(&self) -> impl Iterator<Item = &PoolMember> {
        self.members.iter().filter(|m| m.is_active())
    }

    pub fn has_active_member(&self, user_id: &str) -> bool {
        self.active_members().any(|m| m.user_id == user_id)
    }
}

/// Hypothetical or existing pool offered to a traveler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSuggestion {
    #[serde(rename = "poolId")]
    pub pool_id: Option<String>,
    #[serde(rename = "poolName")]
    pub pool_name: String,
    #[serde(rename = "matchReason")]
    pub match_reason: String,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "candidateUserId")]
    pub candidate_user_id: Option<String>,
    #[serde(rename = "candidateTripId")]
    pub candidate_trip_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "dateRange")]
    pub date_range: String,
    #[serde(rename = "baseCity")]
    pub base_city: String,
    #[serde(rename = "overlapDays")]
    pub overlap_days: Option<u32>,
    #[serde(rename = "routeCompatibility")]
    pub route_compatibility: Option<f64>,
    #[serde(rename = "sharedLocations")]
    pub shared_locations: Vec<String>,
    pub strengths: Vec<String>,
    pub considerations: Vec<String>,
    #[serde(rename = "currentMembers")]
    pub current_members: u32,
    #[serde(rename = "poolCreatedBy")]
    pub pool_created_by: String,
}
