//! API integration tests
//!
//! Tests the protected API against a real SQLite database:
//! - Progress log CRUD scoped to the owner
//! - Preferences upsert
//! - Exercise proxy and recommendations against mocked upstreams

mod common;

use std::sync::Arc;

use common::*;
use fittrack::config::{ExerciseApiConfig, RecommenderConfig};
use fittrack::error::ErrorBody;
use fittrack::integrations::{GeminiRecommender, RapidApiExerciseClient};
use fittrack::models::{ProgressLog, UserPreference};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn log_body(sport: &str, calories: i64) -> serde_json::Value {
    json!({
        "sport": sport,
        "duration": "45",
        "caloriesBurned": calories,
        "tags": "outdoor",
        "pricePerSession": 0,
        "description": "weekend session"
    })
}

/// Test 1: progress log lifecycle for one user
#[tokio::test]
async fn test_progress_log_crud() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "skater", "skater@example.com").await;
    let token = token_for(&tokens, &user);

    let state = create_test_state_with(database, tokens);
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/progress-logs", addr))
        .bearer_auth(&token)
        .json(&log_body("Skating", 380))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!(created["message"], "Progress log created");
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["userId"], user.id);
    assert_eq!(created["data"]["duration"], 45);

    let response = client
        .put(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&token)
        .json(&log_body("Skating", 410))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: ProgressLog = response.json().await.unwrap();
    assert_eq!(fetched.calories_burned, 410);

    let response = client
        .get(format!("http://{}/api/progress-logs", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let logs: Vec<ProgressLog> = response.json().await.unwrap();
    assert_eq!(logs.len(), 1);

    let response = client
        .delete(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test 2: one user cannot see or change another user's logs
#[tokio::test]
async fn test_progress_logs_scoped_to_owner() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let alice = insert_user(database.as_ref(), "alice", "alice@example.com").await;
    let bob = insert_user(database.as_ref(), "bob", "bob@example.com").await;
    let alice_token = token_for(&tokens, &alice);
    let bob_token = token_for(&tokens, &bob);

    let state = create_test_state_with(database, tokens);
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/progress-logs", addr))
        .bearer_auth(&alice_token)
        .json(&log_body("Climbing", 500))
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = response.json().await.unwrap();
    let id = created["data"]["id"].as_i64().unwrap();

    let response = client
        .get(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(format!("http://{}/api/progress-logs", addr))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    let logs: Vec<ProgressLog> = response.json().await.unwrap();
    assert!(logs.is_empty());

    let response = client
        .get(format!("http://{}/api/progress-logs/{}", addr, id))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test 3: invalid progress log input
#[tokio::test]
async fn test_progress_log_validation() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "walker", "walker@example.com").await;
    let token = token_for(&tokens, &user);

    let state = create_test_state_with(database, tokens);
    let (addr, _shutdown) = run_test_server(state).await;

    let mut body = log_body("Walking", 100);
    body["duration"] = json!("a while");
    body["tags"] = json!(null);

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/progress-logs", addr))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorBody = response.json().await.unwrap();
    assert_eq!(
        error.message,
        "duration must be a non-negative integer, tags is required"
    );
}

/// Test 4: preferences are created then replaced
#[tokio::test]
async fn test_preferences_upsert() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "yogi", "yogi@example.com").await;
    let token = token_for(&tokens, &user);

    let state = create_test_state_with(database, tokens);
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/preferences", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for (sports, goal) in [("Yoga", "Flexibility"), ("Pilates", "Core strength")] {
        let response = client
            .put(format!("http://{}/api/preferences", addr))
            .bearer_auth(&token)
            .json(&json!({"preferredSports": sports, "fitnessGoal": goal}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = client
        .get(format!("http://{}/api/preferences", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let preference: UserPreference = response.json().await.unwrap();
    assert_eq!(preference.preferred_sports, "Pilates");
    assert_eq!(preference.fitness_goal, "Core strength");
}

/// Test 5: exercise proxy through the real client
#[tokio::test]
async fn test_exercise_proxy() {
    let upstream = MockServer::start().await;
    let exercises = json!([{"id": "0007", "name": "alternate lateral pulldown", "bodyPart": "back"}]);

    Mock::given(method("GET"))
        .and(path("/exercises/bodyPart/back"))
        .and(header("x-rapidapi-key", "integration-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(exercises.clone()))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/exercises/bodyPart/chest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "lifter", "lifter@example.com").await;
    let token = token_for(&tokens, &user);

    let client_config = ExerciseApiConfig {
        base_url: upstream.uri(),
        api_key: "integration-key".to_string(),
        ..Default::default()
    };
    let mut state = create_test_state_with(database, tokens);
    state.exercises = Some(Arc::new(RapidApiExerciseClient::new(&client_config).unwrap()));
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/exercises/back", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, exercises);

    let response = client
        .get(format!("http://{}/api/exercises/chest", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

/// Test 6: recommendations pick from the user's own logs
#[tokio::test]
async fn test_recommendations() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "triathlete", "tri@example.com").await;
    let token = token_for(&tokens, &user);

    let state = create_test_state_with(Arc::clone(&database), Arc::clone(&tokens));
    let (addr, _shutdown) = run_test_server(state).await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for (sport, calories) in [("Swimming", 600), ("Cycling", 450), ("Running", 700)] {
        let response = client
            .post(format!("http://{}/api/progress-logs", addr))
            .bearer_auth(&token)
            .json(&log_body(sport, calories))
            .send()
            .await
            .unwrap();
        let created: serde_json::Value = response.json().await.unwrap();
        ids.push(created["data"]["id"].as_i64().unwrap());
    }

    let upstream = MockServer::start().await;
    let reply = format!("```json\n[{}, {}]\n```", ids[2], ids[0]);
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": reply }] } }]
        })))
        .mount(&upstream)
        .await;

    let recommender = GeminiRecommender::new(&RecommenderConfig {
        base_url: upstream.uri(),
        model: "test-model".to_string(),
        api_key: "integration-key".to_string(),
        ..Default::default()
    })
    .unwrap();

    let mut state = create_test_state_with(database, tokens);
    state.recommender = Some(Arc::new(recommender));
    let (addr, _shutdown2) = run_test_server(state).await;

    let response = client
        .get(format!("http://{}/api/recommendations", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["generation"], json!([ids[2], ids[0]]));
    assert_eq!(body["logs"][0]["sport"], "Running");
    assert_eq!(body["logs"][1]["sport"], "Swimming");
}

/// Test 7: unconfigured recommender
#[tokio::test]
async fn test_recommendations_not_configured() {
    let database = create_test_database().await;
    let tokens = create_test_tokens();
    let user = insert_user(database.as_ref(), "napper", "napper@example.com").await;
    let token = token_for(&tokens, &user);

    let state = create_test_state_with(database, tokens);
    let (addr, _shutdown) = run_test_server(state).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/recommendations", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
