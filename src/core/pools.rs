//! Pure bookkeeping for trip pools: building members and pools from trips,
//! narrowing shared attributes, and turning matches into suggestions.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;

use crate::core::compatibility::calculate_compatibility;
use crate::core::route::shared_cities;
use crate::models::{
    MemberRole, MemberStatus, PoolMember, PoolStatus, PoolSuggestion, TravelerProfile, Trip,
    TripPool, TripPoolMatch,
};

/// Build a pool member snapshot from a traveler's trip and profile
pub fn new_member(
    trip: &Trip,
    profile: &TravelerProfile,
    role: MemberRole,
    compatibility_score: f64,
    joined_at: DateTime<Utc>,
) -> PoolMember {
    PoolMember {
        user_id: trip.user_id.clone(),
        trip_id: trip.trip_id.clone(),
        trip_name: trip.trip_name.clone(),
        nationality: profile.nationality.clone(),
        languages: profile.languages.clone(),
        trip_categories: trip.categories.clone(),
        pacing: trip.pacing,
        role,
        status: MemberStatus::Active,
        compatibility_score,
        joined_at,
    }
}

/// Distinct planned-place cities in first-seen order
pub fn trip_cities(trip: &Trip) -> Vec<String> {
    let mut seen = HashSet::new();
    trip.planned_places()
        .iter()
        .filter(|p| seen.insert(p.city.clone()))
        .map(|p| p.city.clone())
        .collect()
}

/// Keep only the entries of `current` that also appear in `other`
pub fn intersect_preserving_order(current: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    current
        .iter()
        .filter(|item| other.contains(item.as_str()))
        .cloned()
        .collect()
}

/// Narrow a pool's common interests and cities to what the new trip shares
pub fn narrow_common_attributes(pool: &mut TripPool, trip: &Trip) {
    pool.common_interests = intersect_preserving_order(&pool.common_interests, &trip.categories);

    if trip.places.is_some() {
        pool.common_cities = intersect_preserving_order(&pool.common_cities, &trip_cities(trip));
    }
}

/// Mean compatibility score of the pool's active members
pub fn average_member_compatibility(pool: &TripPool) -> f64 {
    let scores: Vec<f64> = pool.active_members().map(|m| m.compatibility_score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Rebuild a member's trip and profile from its pool snapshot
///
/// The snapshot carries categories, pacing, nationality and languages; dates
/// and base city come from the pool itself.
fn member_as_traveler(pool: &TripPool, member: &PoolMember) -> (Trip, TravelerProfile) {
    let trip = Trip {
        trip_id: member.trip_id.clone(),
        user_id: member.user_id.clone(),
        trip_name: member.trip_name.clone(),
        start_date: pool.start_date,
        end_date: pool.end_date,
        base_city: pool.base_city.clone(),
        categories: member.trip_categories.clone(),
        pacing: member.pacing,
        places: None,
    };
    let profile = TravelerProfile {
        id: member.user_id.clone(),
        email: None,
        first_name: None,
        last_name: None,
        nationality: member.nationality.clone(),
        languages: member.languages.clone(),
    };
    (trip, profile)
}

/// Average compatibility of a traveler against every active pool member
///
/// Returns 1.0 for a pool without active members.
pub fn compatibility_with_pool(
    trip: &Trip,
    profile: &TravelerProfile,
    pool: &TripPool,
    flexibility_days: u32,
) -> f64 {
    let scores: Vec<f64> = pool
        .active_members()
        .map(|member| {
            let (member_trip, member_profile) = member_as_traveler(pool, member);
            calculate_compatibility(trip, &member_trip, profile, &member_profile, flexibility_days)
                .overall_score
        })
        .collect();

    if scores.is_empty() {
        return 1.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Add a traveler to the pool and refresh its aggregates
pub fn add_member(pool: &mut TripPool, trip: &Trip, member: PoolMember, now: DateTime<Utc>) {
    narrow_common_attributes(pool, trip);
    pool.members.push(member);
    pool.current_members += 1;
    pool.average_compatibility_score = average_member_compatibility(pool);
    pool.updated_at = now;
}

/// Mark a member as departed
///
/// A departing creator hands the role to the longest-standing active member.
/// The pool is cancelled once fewer than `min_pool_size` members remain.
/// Returns `false` when the user is not an active member.
pub fn remove_member(
    pool: &mut TripPool,
    user_id: &str,
    min_pool_size: u32,
    now: DateTime<Utc>,
) -> bool {
    let Some(index) = pool
        .members
        .iter()
        .position(|m| m.user_id == user_id && m.is_active())
    else {
        return false;
    };

    let leaving = &mut pool.members[index];
    let was_creator = leaving.role == MemberRole::Creator;
    leaving.status = MemberStatus::Left;
    leaving.role = MemberRole::Member;
    pool.current_members = pool.current_members.saturating_sub(1);

    if was_creator {
        if let Some(successor) = pool.members.iter_mut().find(|m| m.is_active()) {
            successor.role = MemberRole::Creator;
            pool.created_by_user_id = successor.user_id.clone();
        }
    }

    if pool.current_members < min_pool_size {
        pool.status = PoolStatus::Cancelled;
    }

    pool.average_compatibility_score = average_member_compatibility(pool);
    pool.updated_at = now;
    true
}

/// Format a date range for display
///
/// Examples: "Aug 15-17, 2025" within one month, "Aug 15 - Sep 2, 2025"
/// across months.
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    if start.year() == end.year() && start.month() == end.month() {
        format!("{}-{}, {}", start.format("%b %-d"), end.day(), start.year())
    } else {
        format!("{} - {}, {}", start.format("%b %-d"), end.format("%b %-d"), end.year())
    }
}

/// Generate a human-friendly join code of the form `POOL12345`
pub fn generate_join_code(now: DateTime<Utc>) -> String {
    format!("POOL{:05}", now.timestamp_millis().rem_euclid(100_000))
}

/// Build a fresh FORMING pool around its creator
pub fn new_pool(
    pool_id: String,
    trip: &Trip,
    profile: &TravelerProfile,
    pool_name: Option<String>,
    description: Option<String>,
    max_members: u32,
    now: DateTime<Utc>,
) -> TripPool {
    let creator = new_member(trip, profile, MemberRole::Creator, 1.0, now);

    TripPool {
        pool_id,
        pool_name: pool_name.unwrap_or_else(|| format!("Trip to {}", trip.base_city)),
        description,
        status: PoolStatus::Forming,
        start_date: trip.start_date,
        end_date: trip.end_date,
        base_city: trip.base_city.clone(),
        members: vec![creator],
        created_by_user_id: trip.user_id.clone(),
        max_members,
        current_members: 1,
        common_interests: trip.categories.clone(),
        common_cities: trip_cities(trip),
        average_compatibility_score: 1.0,
        is_public: true,
        allow_join_requests: true,
        join_code: generate_join_code(now),
        created_at: now,
        updated_at: now,
        version: 0,
    }
}

/// Turn an engine match into a suggestion for a new two-person pool
pub fn suggestion_from_match(target_trip: &Trip, m: &TripPoolMatch) -> PoolSuggestion {
    let overlap = &m.timeline_overlap;

    PoolSuggestion {
        pool_id: None,
        pool_name: format!("Trip with {}", m.candidate_profile.display_name()),
        match_reason: "Timeline-based compatibility".to_string(),
        compatibility_score: m.overall_score(),
        candidate_user_id: Some(m.candidate_trip.user_id.clone()),
        candidate_trip_id: Some(m.candidate_trip.trip_id.clone()),
        start_date: overlap.overlap_start,
        end_date: overlap.overlap_end,
        date_range: format_date_range(overlap.overlap_start, overlap.overlap_end),
        base_city: target_trip.base_city.clone(),
        overlap_days: Some(overlap.overlap_days),
        route_compatibility: Some(m.route_compatibility),
        shared_locations: shared_cities(target_trip, &m.candidate_trip),
        strengths: m.compatibility_score.compatibility_reasons.clone(),
        considerations: m.compatibility_score.incompatibility_warnings.clone(),
        current_members: 1,
        pool_created_by: m.candidate_profile.display_name().to_string(),
    }
}

/// Suggest joining an existing pool
pub fn suggestion_from_pool(pool: &TripPool, compatibility_score: f64) -> PoolSuggestion {
    PoolSuggestion {
        pool_id: Some(pool.pool_id.clone()),
        pool_name: pool.pool_name.clone(),
        match_reason: "Existing pool match".to_string(),
        compatibility_score,
        candidate_user_id: None,
        candidate_trip_id: None,
        start_date: pool.start_date,
        end_date: pool.end_date,
        date_range: format_date_range(pool.start_date, pool.end_date),
        base_city: pool.base_city.clone(),
        overlap_days: None,
        route_compatibility: None,
        shared_locations: pool.common_cities.clone(),
        strengths: pool.common_interests.clone(),
        considerations: vec![],
        current_members: pool.current_members,
        pool_created_by: pool.created_by_user_id.clone(),
    }
}
