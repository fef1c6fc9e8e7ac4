use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::models::Trip;
use crate::services::providers::{ClientError, TripSource};

/// Trip-planning service client
///
/// Read-only access to planned trips:
/// - Single trips on behalf of their owner
/// - Trips of one user
/// - Trips touching a date range or starting from a city
pub struct TripServiceClient {
    base_url: String,
    client: Client,
}

impl TripServiceClient {
    /// Create a new trip service client
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Fetch a JSON array of trips, dropping entries that don't decode
    async fn fetch_trip_list(&self, url: &str) -> Result<Vec<Trip>, ClientError> {
        tracing::debug!("Fetching trips from: {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            return Err(ClientError::ApiError(format!(
                "Failed to fetch trips: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let entries = json
            .as_array()
            .ok_or_else(|| ClientError::InvalidResponse("Expected a JSON array of trips".into()))?;

        let trips: Vec<Trip> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<Trip>(entry.clone()) {
                Ok(trip) => Some(trip),
                Err(e) => {
                    tracing::warn!("Skipping undecodable trip: {}", e);
                    None
                }
            })
            .collect();

        Ok(trips)
    }

    /// Health check for the trip-planning service
    pub async fn is_healthy(&self) -> bool {
        let response = match self.client.get(self.url("/health")).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Trip service health check failed: {}", e);
                return false;
            }
        };

        response.status().is_success()
            && response.text().await.map(|body| body.trim() == "OK").unwrap_or(false)
    }
}

#[async_trait]
impl TripSource for TripServiceClient {
    async fn fetch_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, ClientError> {
        let url = self.url(&format!("/trip/{}", urlencoding::encode(trip_id)));
        tracing::debug!("Fetching trip {} for user {}", trip_id, user_id);

        let response = self.client.get(&url).header("userId", user_id).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ClientError::ApiError(format!(
                "Failed to fetch trip {}: {}",
                trip_id,
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        serde_json::from_value(json)
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse trip: {}", e)))
    }

    async fn fetch_trips_for_user(&self, user_id: &str) -> Result<Vec<Trip>, ClientError> {
        let url = self.url(&format!("/trip/user/{}", urlencoding::encode(user_id)));
        self.fetch_trip_list(&url).await
    }

    async fn fetch_trips_in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Trip>, ClientError> {
        let url = self.url(&format!(
            "/trip/search/date-range?startDate={}&endDate={}",
            start, end
        ));
        self.fetch_trip_list(&url).await
    }

    async fn fetch_trips_by_base_city(&self, base_city: &str) -> Result<Vec<Trip>, ClientError> {
        let url = self.url(&format!("/trip/search/city/{}", urlencoding::encode(base_city)));
        self.fetch_trip_list(&url).await
    }
}
