//! User preference models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Training preferences of a user (one row per user)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub user_id: i64,
    pub preferred_sports: String,
    pub fitness_goal: String,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /api/preferences`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    pub preferred_sports: Option<String>,
    pub fitness_goal: Option<String>,
}

impl PreferenceRequest {
    /// Returns `(preferred_sports, fitness_goal)` or the validation messages
    pub fn validate(&self) -> Result<(String, String), Vec<String>> {
        let mut errors = Vec::new();

        let sports = self
            .preferred_sports
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let goal = self
            .fitness_goal
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if sports.is_none() {
            errors.push("preferredSports is required".to_string());
        }
        if goal.is_none() {
            errors.push("fitnessGoal is required".to_string());
        }

        match (sports, goal) {
            (Some(s), Some(g)) => Ok((s.to_string(), g.to_string())),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_request_validate() {
        let req = PreferenceRequest {
            preferred_sports: Some("Swimming".to_string()),
            fitness_goal: Some(" Endurance ".to_string()),
        };
        assert_eq!(
            req.validate().unwrap(),
            ("Swimming".to_string(), "Endurance".to_string())
        );

        let errors = PreferenceRequest::default().validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["preferredSports is required", "fitnessGoal is required"]
        );
    }
}
