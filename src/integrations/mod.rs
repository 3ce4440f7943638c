//! Outbound HTTP collaborators
//!
//! - Exercise data lookups against the RapidAPI ExerciseDB service
//! - Workout recommendations from a generative language model

pub mod exercise;
pub mod recommender;

pub use exercise::{ExerciseSource, RapidApiExerciseClient};
pub use recommender::{GeminiRecommender, Recommender};

use std::time::Duration;

use reqwest::Client;

use crate::error::UpstreamError;

/// Build the shared reqwest client for an integration
fn build_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Network(e.to_string()))
}

/// Map a transport error to the upstream error taxonomy
fn map_reqwest_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_decode() {
        UpstreamError::InvalidResponse(e.to_string())
    } else {
        UpstreamError::Network(e.to_string())
    }
}

/// Join path segments onto a configured base URL, percent-encoding each one
fn join_url(base_url: &str, segments: &[&str]) -> Result<reqwest::Url, UpstreamError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| UpstreamError::NotConfigured(format!("invalid base url: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| UpstreamError::NotConfigured("base url cannot have a path".to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
