use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{TravelerProfile, Trip};
use crate::services::cache::{CacheKey, CacheManager};

/// Errors that can occur when talking to the trip or user services
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of trips, normally the trip-planning service
#[async_trait]
pub trait TripSource: Send + Sync {
    /// Fetch one trip on behalf of its owner; `None` when it doesn't exist
    async fn fetch_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, ClientError>;

    async fn fetch_trips_for_user(&self, user_id: &str) -> Result<Vec<Trip>, ClientError>;

    /// Trips touching the inclusive range `[start, end]`
    async fn fetch_trips_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Trip>, ClientError>;

    async fn fetch_trips_by_base_city(&self, base_city: &str) -> Result<Vec<Trip>, ClientError>;
}

/// Source of traveler profiles, normally the user service
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<TravelerProfile>, ClientError>;
}

/// Read-through cache in front of a trip or profile source
///
/// Single trips and profiles are cached; list queries always go upstream.
pub struct Cached<S> {
    inner: S,
    cache: Arc<CacheManager>,
}

impl<S> Cached<S> {
    pub fn new(inner: S, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<S: TripSource> TripSource for Cached<S> {
    async fn fetch_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, ClientError> {
        let key = CacheKey::trip(user_id, trip_id);
        if let Ok(trip) = self.cache.get::<Trip>(&key).await {
            return Ok(Some(trip));
        }

        let trip = self.inner.fetch_trip(trip_id, user_id).await?;
        if let Some(trip) = &trip {
            if let Err(e) = self.cache.set(&key, trip).await {
                tracing::warn!("Failed to cache trip {}: {}", trip_id, e);
            }
        }
        Ok(trip)
    }

    async fn fetch_trips_for_user(&self, user_id: &str) -> Result<Vec<Trip>, ClientError> {
        self.inner.fetch_trips_for_user(user_id).await
    }

    async fn fetch_trips_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Trip>, ClientError> {
        self.inner.fetch_trips_in_date_range(start, end).await
    }

    async fn fetch_trips_by_base_city(&self, base_city: &str) -> Result<Vec<Trip>, ClientError> {
        self.inner.fetch_trips_by_base_city(base_city).await
    }
}

#[async_trait]
impl<S: ProfileSource> ProfileSource for Cached<S> {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<TravelerProfile>, ClientError> {
        let key = CacheKey::profile(user_id);
        if let Ok(profile) = self.cache.get::<TravelerProfile>(&key).await {
            return Ok(Some(profile));
        }

        let profile = self.inner.fetch_profile(user_id).await?;
        if let Some(profile) = &profile {
            if let Err(e) = self.cache.set(&key, profile).await {
                tracing::warn!("Failed to cache profile {}: {}", user_id, e);
            }
        }
        Ok(profile)
    }
}
