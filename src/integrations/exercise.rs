//! Exercise data source
//!
//! Fetches exercises for a body part from the RapidAPI ExerciseDB service and
//! hands the JSON back unchanged.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ExerciseApiConfig;
use crate::error::UpstreamError;

use super::{build_client, join_url, map_reqwest_error};

/// Source of exercise data
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExerciseSource: Send + Sync {
    /// Exercises targeting `body_part` (e.g. "back", "upper arms")
    async fn exercises_by_body_part(
        &self,
        body_part: &str,
    ) -> Result<serde_json::Value, UpstreamError>;
}

/// ExerciseDB client
///
/// The API key and host header values come from configuration.
#[derive(Debug, Clone)]
pub struct RapidApiExerciseClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl RapidApiExerciseClient {
    /// Create a client from configuration
    pub fn new(config: &ExerciseApiConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::NotConfigured(
                "exercise_api.api_key".to_string(),
            ));
        }

        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        })
    }
}

#[async_trait]
impl ExerciseSource for RapidApiExerciseClient {
    async fn exercises_by_body_part(
        &self,
        body_part: &str,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = join_url(&self.base_url, &["exercises", "bodyPart", body_part])?;

        debug!(body_part = body_part, "Fetching exercises");

        let response = self
            .client
            .get(url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                body_part = body_part,
                status = status.as_u16(),
                "Exercise API returned an error"
            );
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response.json().await.map_err(map_reqwest_error)
    }
}
