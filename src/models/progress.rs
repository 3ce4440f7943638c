//! Progress log models
//!
//! A progress log records one training session of a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress log stored in database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLog {
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    pub sport: String,

    /// Session length in minutes
    pub duration: i64,

    pub calories_burned: i64,

    /// Free-form comma separated tags
    pub tags: String,

    pub price_per_session: i64,

    pub description: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Validated fields of a progress log, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLogFields {
    pub sport: String,
    pub duration: i64,
    pub calories_burned: i64,
    pub tags: String,
    pub price_per_session: i64,
    pub description: String,
}

/// Body of the create and update progress log endpoints
///
/// Numeric fields accept JSON numbers or numeric strings, mirroring form
/// submissions from the web client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressLogRequest {
    pub sport: Option<String>,
    pub duration: Option<serde_json::Value>,
    pub calories_burned: Option<serde_json::Value>,
    pub tags: Option<String>,
    pub price_per_session: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl ProgressLogRequest {
    /// Validate the request
    ///
    /// Returns one message per missing or invalid field, in field order.
    pub fn validate(&self) -> Result<ProgressLogFields, Vec<String>> {
        let mut errors = Vec::new();

        let sport = required_text(&self.sport, "sport", &mut errors);
        let duration = required_number(&self.duration, "duration", &mut errors);
        let calories_burned = required_number(&self.calories_burned, "caloriesBurned", &mut errors);
        let tags = required_text(&self.tags, "tags", &mut errors);
        let price_per_session =
            required_number(&self.price_per_session, "pricePerSession", &mut errors);
        let description = required_text(&self.description, "description", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProgressLogFields {
            sport: sport.unwrap_or_default(),
            duration: duration.unwrap_or_default(),
            calories_burned: calories_burned.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
            price_per_session: price_per_session.unwrap_or_default(),
            description: description.unwrap_or_default(),
        })
    }
}

fn required_text(value: &Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(format!("{} is required", field));
            None
        }
    }
}

fn required_number(
    value: &Option<serde_json::Value>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let parsed = match value {
        None | Some(serde_json::Value::Null) => {
            errors.push(format!("{} is required", field));
            return None;
        }
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            errors.push(format!("{} is required", field));
            return None;
        }
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(n) if n >= 0 => Some(n),
        _ => {
            errors.push(format!("{} must be a non-negative integer", field));
            None
        }
    }
}
