use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::pools::{
    add_member, compatibility_with_pool, new_member, new_pool, remove_member,
    suggestion_from_match, suggestion_from_pool,
};
use crate::core::{flexed_range, PoolMatcher};
use crate::error::PoolingError;
use crate::models::{
    CreatePoolRequest, JoinPoolRequest, MemberRole, PoolSuggestion, PoolingRequest,
    TravelerProfile, Trip, TripPool,
};
use crate::services::providers::{ProfileSource, TripSource};
use crate::services::repository::PoolRepository;

/// Read-modify-write rounds before a contended pool update gives up
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Pool size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_pool_size: u32,
    /// A pool drops to CANCELLED below this many active members
    pub min_pool_size: u32,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_pool_size: 6,
            min_pool_size: 2,
        }
    }
}

/// Pool suggestion and membership workflows
///
/// Pulls trips and profiles from the upstream services, runs the matching
/// engine and keeps pools in the repository.
pub struct PoolingService {
    trips: Arc<dyn TripSource>,
    profiles: Arc<dyn ProfileSource>,
    pools: Arc<dyn PoolRepository>,
    matcher: PoolMatcher,
    limits: PoolLimits,
}

impl PoolingService {
    pub fn new(
        trips: Arc<dyn TripSource>,
        profiles: Arc<dyn ProfileSource>,
        pools: Arc<dyn PoolRepository>,
        matcher: PoolMatcher,
        limits: PoolLimits,
    ) -> Self {
        Self {
            trips,
            profiles,
            pools,
            matcher,
            limits,
        }
    }

    pub fn matcher(&self) -> &PoolMatcher {
        &self.matcher
    }

    /// A trip owned by `user_id`; anyone else's trip reads as missing
    async fn load_trip(&self, trip_id: &str, user_id: &str) -> Result<Trip, PoolingError> {
        match self.trips.fetch_trip(trip_id, user_id).await? {
            Some(trip) if trip.user_id == user_id => Ok(trip),
            Some(_) => {
                tracing::warn!("User {} requested trip {} owned by someone else", user_id, trip_id);
                Err(PoolingError::NotFound(format!("Trip not found: {}", trip_id)))
            }
            None => Err(PoolingError::NotFound(format!("Trip not found: {}", trip_id))),
        }
    }

    async fn load_profile(&self, user_id: &str) -> Result<TravelerProfile, PoolingError> {
        self.profiles
            .fetch_profile(user_id)
            .await?
            .ok_or_else(|| PoolingError::NotFound(format!("Profile not found: {}", user_id)))
    }

    async fn load_pool(&self, pool_id: &str) -> Result<TripPool, PoolingError> {
        self.pools
            .find_by_id(pool_id)
            .await?
            .ok_or_else(|| PoolingError::NotFound(format!("Pool not found: {}", pool_id)))
    }

    /// Profiles of the given owners; lookups that fail or miss are left out
    async fn load_candidate_profiles(&self, user_ids: &[&str]) -> HashMap<String, TravelerProfile> {
        let mut profiles = HashMap::with_capacity(user_ids.len());
        for user_id in user_ids {
            match self.profiles.fetch_profile(user_id).await {
                Ok(Some(profile)) => {
                    profiles.insert(user_id.to_string(), profile);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to fetch profile for {}: {}", user_id, e),
            }
        }
        profiles
    }

    /// Suggest travel companions and joinable pools for a stored trip
    pub async fn find_potential_pools(
        &self,
        request: &PoolingRequest,
    ) -> Result<Vec<PoolSuggestion>, PoolingError> {
        let trip = self.load_trip(&request.trip_id, &request.user_id).await?;
        let profile = self.load_profile(&request.user_id).await?;

        let config = self.matcher.config().with_overrides(
            request.date_flexibility_days,
            request.min_compatibility_score,
            request.max_distance_km,
        );

        let (window_start, window_end) =
            flexed_range(trip.start_date, trip.end_date, config.flexibility_days);

        let candidates: Vec<Trip> = self
            .trips
            .fetch_trips_in_date_range(window_start, window_end)
            .await?
            .into_iter()
            .filter(|candidate| candidate.user_id != request.user_id)
            .collect();

        let mut owners: Vec<&str> = candidates.iter().map(|c| c.user_id.as_str()).collect();
        owners.sort_unstable();
        owners.dedup();
        let candidate_profiles = self.load_candidate_profiles(&owners).await;

        // Travelers already sharing an open pool with the requester
        let existing_pools = self.pools.find_by_member(&request.user_id).await?;
        let pooled_with: HashSet<String> = existing_pools
            .iter()
            .filter(|pool| pool.status.is_open())
            .flat_map(|pool| pool.active_members().map(|m| m.user_id.clone()))
            .collect();

        let matches = PoolMatcher::new(config).find_timeline_matches(
            &trip,
            &profile,
            &candidates,
            &candidate_profiles,
        );

        let mut suggestions: Vec<PoolSuggestion> = matches
            .iter()
            .filter(|m| !pooled_with.contains(&m.candidate_trip.user_id))
            .map(|m| suggestion_from_match(&trip, m))
            .collect();

        let joinable = self
            .pools
            .find_open_overlapping(trip.start_date, trip.end_date)
            .await?;

        suggestions.extend(
            joinable
                .iter()
                .filter(|pool| {
                    pool.allow_join_requests
                        && !pool.is_full()
                        && !pool.has_active_member(&request.user_id)
                })
                .filter_map(|pool| {
                    let score =
                        compatibility_with_pool(&trip, &profile, pool, config.flexibility_days);
                    (score >= config.min_compatibility_score)
                        .then(|| suggestion_from_pool(pool, score))
                }),
        );

        suggestions.sort_by(|a, b| {
            b.compatibility_score
                .partial_cmp(&a.compatibility_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            "Returning {} pool suggestions for trip {} ({} candidates)",
            suggestions.len(),
            trip.trip_id,
            candidates.len()
        );

        Ok(suggestions)
    }

    /// Start a new pool with the requester as creator
    pub async fn create_pool(&self, request: &CreatePoolRequest) -> Result<TripPool, PoolingError> {
        let trip = self.load_trip(&request.trip_id, &request.user_id).await?;
        let profile = self.load_profile(&request.user_id).await?;

        let pool = new_pool(
            uuid::Uuid::new_v4().to_string(),
            &trip,
            &profile,
            request.pool_name.clone(),
            request.description.clone(),
            self.limits.max_pool_size,
            Utc::now(),
        );

        self.pools.save(&pool).await?;

        tracing::info!(
            "Created pool {} for {} ({} day trip from {})",
            pool.pool_id,
            request.user_id,
            trip.span_days(),
            trip.base_city
        );

        Ok(pool)
    }

    /// Add a traveler's trip to an open pool
    pub async fn join_pool(
        &self,
        pool_id: &str,
        request: &JoinPoolRequest,
    ) -> Result<TripPool, PoolingError> {
        let trip = self.load_trip(&request.trip_id, &request.user_id).await?;
        let profile = self.load_profile(&request.user_id).await?;
        let flexibility_days = self.matcher.config().flexibility_days;
        let mut score = 0.0;

        let pool = self
            .modify_pool(pool_id, |pool| {
                if !pool.status.is_open() || !pool.allow_join_requests {
                    return Err(PoolingError::PoolClosed(pool_id.to_string()));
                }
                if pool.is_full() {
                    return Err(PoolingError::PoolFull(pool_id.to_string()));
                }
                if pool.has_active_member(&request.user_id) {
                    return Err(PoolingError::AlreadyMember {
                        pool_id: pool_id.to_string(),
                        user_id: request.user_id.clone(),
                    });
                }

                score = compatibility_with_pool(&trip, &profile, pool, flexibility_days);

                let now = Utc::now();
                let member = new_member(&trip, &profile, MemberRole::Member, score, now);
                add_member(pool, &trip, member, now);
                Ok(())
            })
            .await?;

        tracing::info!(
            "User {} joined pool {} with compatibility {:.3}",
            request.user_id,
            pool_id,
            score
        );

        Ok(pool)
    }

    /// Remove a traveler from a pool
    pub async fn leave_pool(&self, pool_id: &str, user_id: &str) -> Result<TripPool, PoolingError> {
        let min_pool_size = self.limits.min_pool_size;

        let pool = self
            .modify_pool(pool_id, |pool| {
                if remove_member(pool, user_id, min_pool_size, Utc::now()) {
                    Ok(())
                } else {
                    Err(PoolingError::NotMember {
                        pool_id: pool_id.to_string(),
                        user_id: user_id.to_string(),
                    })
                }
            })
            .await?;

        tracing::info!(
            "User {} left pool {} (status now {:?})",
            user_id,
            pool_id,
            pool.status
        );

        Ok(pool)
    }

    /// Apply `change` to the stored pool, re-reading it when another writer
    /// stored a newer version in between
    async fn modify_pool<F>(&self, pool_id: &str, mut change: F) -> Result<TripPool, PoolingError>
    where
        F: FnMut(&mut TripPool) -> Result<(), PoolingError>,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut pool = self.load_pool(pool_id).await?;
            let expected_version = pool.version;

            change(&mut pool)?;
            pool.version = expected_version + 1;

            if self.pools.update(&pool, expected_version).await? {
                return Ok(pool);
            }

            tracing::debug!(
                "Pool {} changed concurrently (attempt {}/{})",
                pool_id,
                attempt,
                MAX_UPDATE_ATTEMPTS
            );
        }

        tracing::warn!("Giving up on pool {} after {} attempts", pool_id, MAX_UPDATE_ATTEMPTS);
        Err(PoolingError::Conflict(pool_id.to_string()))
    }

    /// A single pool by id
    pub async fn get_pool(&self, pool_id: &str) -> Result<TripPool, PoolingError> {
        self.load_pool(pool_id).await
    }

    /// Pools the user created or is an active member of
    pub async fn user_pools(&self, user_id: &str) -> Result<Vec<TripPool>, PoolingError> {
        let created = self.pools.find_by_creator(user_id).await?;
        let joined = self.pools.find_by_member(user_id).await?;

        let mut seen = HashSet::new();
        Ok(created
            .into_iter()
            .chain(joined)
            .filter(|pool| seen.insert(pool.pool_id.clone()))
            .collect())
    }

    /// Whether pool storage is reachable
    pub async fn storage_healthy(&self) -> bool {
        match self.pools.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Pool storage health check failed: {}", e);
                false
            }
        }
    }
}
