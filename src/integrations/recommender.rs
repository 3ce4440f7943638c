//! Workout recommendations
//!
//! The recommender is an opaque scorer: it receives the candidate progress
//! logs and answers with the IDs of the ones it recommends.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RecommenderConfig;
use crate::error::UpstreamError;
use crate::models::ProgressLog;

use super::{build_client, join_url, map_reqwest_error};

/// Picks recommended logs out of a candidate list
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Return the IDs of the recommended candidates
    async fn recommend(&self, candidates: &[ProgressLog]) -> Result<Vec<i64>, UpstreamError>;
}

/// Recommender backed by the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiRecommender {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiRecommender {
    /// Create a recommender from configuration
    pub fn new(config: &RecommenderConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::NotConfigured(
                "recommender.api_key".to_string(),
            ));
        }

        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn recommend(&self, candidates: &[ProgressLog]) -> Result<Vec<i64>, UpstreamError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = format!("{}:generateContent", self.model);
        let url = join_url(&self.base_url, &["models", endpoint.as_str()])?;

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(candidates) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "INTEGER" } }
            }
        });

        debug!(
            model = %self.model,
            candidates = candidates.len(),
            "Requesting recommendations"
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Recommendation API returned an error");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(map_reqwest_error)?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| UpstreamError::InvalidResponse("no candidates".to_string()))?;

        parse_ids(&text)
    }
}

/// Build the scoring prompt, one line per candidate
pub fn build_prompt(candidates: &[ProgressLog]) -> String {
    let list = candidates
        .iter()
        .map(|log| format!("- {} (ID: {})", log.calories_burned, log.id))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Recommend the sports that burn the most fat from the list below.\n\
         Each line is the calories burned in one session followed by its ID.\n\n\
         {}\n\n\
         Criteria:\n\
         - Highly calories burned\n\
         Respond with a JSON array of IDs.",
        list
    )
}

/// Parse the model output into IDs
///
/// Accepts a bare JSON array or one wrapped in a Markdown code fence.
fn parse_ids(text: &str) -> Result<Vec<i64>, UpstreamError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced)
        .map_err(|e| UpstreamError::InvalidResponse(format!("expected an array of IDs: {}", e)))
}
