use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::models::TravelerProfile;
use crate::services::providers::{ClientError, ProfileSource};

/// User service client
///
/// The user service looks tourists up by email, which doubles as the
/// traveler identifier on trips.
pub struct UserServiceClient {
    base_url: String,
    client: Client,
}

impl UserServiceClient {
    /// Create a new user service client
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { base_url, client })
    }
}

/// Decode a tourist profile document
///
/// Null fields are treated as absent and the identifier falls back to the
/// one used for the lookup.
fn parse_profile(user_id: &str, json: Value) -> Result<TravelerProfile, ClientError> {
    let Value::Object(mut fields) = json else {
        return Err(ClientError::InvalidResponse("Expected a profile object".into()));
    };

    fields.retain(|_, value| !value.is_null());
    fields
        .entry("id")
        .or_insert_with(|| Value::String(user_id.to_string()));

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse profile: {}", e)))
}

#[async_trait]
impl ProfileSource for UserServiceClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<TravelerProfile>, ClientError> {
        let url = format!(
            "{}/api/v1/tourist/profile?email={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching user profile from: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("User profile not found for: {}", user_id);
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ClientError::ApiError(format!(
                "Failed to fetch profile: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_profile(user_id, json).map(Some)
    }
}
