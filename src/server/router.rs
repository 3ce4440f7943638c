//! HTTP router for fittrack
//!
//! This module defines the axum router that handles all HTTP requests.
//! It provides routes for:
//! - Health checks
//! - Registration and login
//! - Progress logs and preferences of the authenticated user
//! - Exercise lookups and workout recommendations

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::middleware::{auth_middleware, AuthenticatedPrincipal};
use crate::auth::AuthManager;
use crate::database::Database;
use crate::error::{AppError, UpstreamError};
use crate::integrations::{ExerciseSource, Recommender};
use crate::models::{
    LoginRequest, LoginResponse, PreferenceRequest, Principal, ProgressLog, ProgressLogRequest,
    RegisterRequest, User, UserPreference,
};

/// Shared application state
pub struct AppState<D: Database> {
    /// Authentication manager
    pub auth_manager: Arc<AuthManager<D>>,

    /// Database
    pub database: Arc<D>,

    /// Exercise data source, if configured
    pub exercises: Option<Arc<dyn ExerciseSource>>,

    /// Recommendation service, if configured
    pub recommender: Option<Arc<dyn Recommender>>,
}

impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            auth_manager: Arc::clone(&self.auth_manager),
            database: Arc::clone(&self.database),
            exercises: self.exercises.clone(),
            recommender: self.recommender.clone(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of the create and update progress log responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressLogResponse {
    pub message: String,
    pub data: ProgressLog,
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Recommendation response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    /// Recommended log IDs, best first
    pub generation: Vec<i64>,
    /// The recommended logs, in the same order
    pub logs: Vec<ProgressLog>,
}

/// Build the main application router
///
/// Everything under `/api` goes through the authentication middleware.
pub fn build_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let protected = Router::new()
        .route("/api/me", get(me_handler).delete(delete_me_handler::<D>))
        .route(
            "/api/progress-logs",
            get(list_progress_logs_handler::<D>).post(create_progress_log_handler::<D>),
        )
        .route(
            "/api/progress-logs/:id",
            get(get_progress_log_handler::<D>)
                .put(update_progress_log_handler::<D>)
                .delete(delete_progress_log_handler::<D>),
        )
        .route(
            "/api/preferences",
            get(get_preferences_handler::<D>).put(put_preferences_handler::<D>),
        )
        .route("/api/exercises/:body_part", get(exercises_handler::<D>))
        .route("/api/recommendations", get(recommendations_handler::<D>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.auth_manager),
            auth_middleware::<D>,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler::<D>))
        .route("/login", post(login_handler::<D>))
        .merge(protected)
        .with_state(state)
}

// =============================================================================
// Health Handler
// =============================================================================

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Account Handlers
// =============================================================================

async fn register_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let user = state.auth_manager.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let response = state.auth_manager.login(request).await?;
    Ok(Json(response))
}

/// Echo the authenticated principal
async fn me_handler(
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Json<Principal> {
    Json(principal)
}

/// Delete the authenticated user's account
async fn delete_me_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_manager.delete_account(&principal).await?;
    Ok(Json(MessageResponse {
        message: "Account deleted".to_string(),
    }))
}

// =============================================================================
// Progress Log Handlers
// =============================================================================

async fn list_progress_logs_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Result<Json<Vec<ProgressLog>>, AppError> {
    let logs = state.database.list_progress_logs(principal.id).await?;
    Ok(Json(logs))
}

async fn create_progress_log_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    payload: Result<Json<ProgressLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProgressLogResponse>), AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let fields = request.validate().map_err(AppError::Validation)?;

    let log = state
        .database
        .create_progress_log(principal.id, &fields)
        .await?;

    tracing::info!(user_id = principal.id, log_id = log.id, "Progress log created");
    Ok((
        StatusCode::CREATED,
        Json(ProgressLogResponse {
            message: "Progress log created".to_string(),
            data: log,
        }),
    ))
}

async fn get_progress_log_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ProgressLog>, AppError> {
    let Path(id) = id.map_err(invalid_id)?;
    let log = owned_progress_log(state.database.as_ref(), id, principal.id).await?;
    Ok(Json(log))
}

async fn update_progress_log_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProgressLogRequest>, JsonRejection>,
) -> Result<Json<ProgressLogResponse>, AppError> {
    let Path(id) = id.map_err(invalid_id)?;
    let Json(request) = payload.map_err(invalid_body)?;

    owned_progress_log(state.database.as_ref(), id, principal.id).await?;
    let fields = request.validate().map_err(AppError::Validation)?;

    let log = state
        .database
        .update_progress_log(id, &fields)
        .await?
        .ok_or_else(progress_log_not_found)?;

    Ok(Json(ProgressLogResponse {
        message: "Progress log updated".to_string(),
        data: log,
    }))
}

async fn delete_progress_log_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(invalid_id)?;

    owned_progress_log(state.database.as_ref(), id, principal.id).await?;
    if !state.database.delete_progress_log(id).await? {
        return Err(progress_log_not_found());
    }

    tracing::info!(user_id = principal.id, log_id = id, "Progress log deleted");
    Ok(Json(MessageResponse {
        message: "Progress log deleted".to_string(),
    }))
}

/// Fetch a log, answering 404 for logs owned by someone else
async fn owned_progress_log<D: Database>(
    db: &D,
    id: i64,
    owner: i64,
) -> Result<ProgressLog, AppError> {
    match db.get_progress_log(id).await? {
        Some(log) if log.user_id == owner => Ok(log),
        _ => Err(progress_log_not_found()),
    }
}

fn progress_log_not_found() -> AppError {
    AppError::NotFound("Progress log not found".to_string())
}

// =============================================================================
// Preference Handlers
// =============================================================================

async fn get_preferences_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Result<Json<UserPreference>, AppError> {
    state
        .database
        .get_preference(principal.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Preferences not found".to_string()))
}

async fn put_preferences_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
    payload: Result<Json<PreferenceRequest>, JsonRejection>,
) -> Result<Json<UserPreference>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let (sports, goal) = request.validate().map_err(AppError::Validation)?;

    let preference = state
        .database
        .upsert_preference(principal.id, &sports, &goal)
        .await?;
    Ok(Json(preference))
}

// =============================================================================
// Integration Handlers
// =============================================================================

async fn exercises_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(body_part): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let body_part = body_part.trim();
    if body_part.is_empty()
        || body_part.len() > 64
        || !body_part.chars().all(|c| c.is_ascii_alphabetic() || c == ' ')
    {
        return Err(AppError::validation(
            "bodyPart must contain only letters and spaces",
        ));
    }

    let source = state
        .exercises
        .as_ref()
        .ok_or_else(|| UpstreamError::NotConfigured("exercise_api".to_string()))?;

    let exercises = source.exercises_by_body_part(body_part).await?;
    Ok(Json(exercises))
}

async fn recommendations_handler<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(AuthenticatedPrincipal(principal)): Extension<AuthenticatedPrincipal>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let recommender = state
        .recommender
        .as_ref()
        .ok_or_else(|| UpstreamError::NotConfigured("recommender".to_string()))?;

    let candidates = state.database.list_progress_logs(principal.id).await?;
    let ids = recommender.recommend(&candidates).await?;

    let mut by_id: HashMap<i64, ProgressLog> =
        candidates.into_iter().map(|log| (log.id, log)).collect();

    let mut generation = Vec::with_capacity(ids.len());
    let mut logs = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(log) = by_id.remove(&id) {
            generation.push(id);
            logs.push(log);
        }
    }

    Ok(Json(RecommendationResponse { generation, logs }))
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
}

fn invalid_id(_: PathRejection) -> AppError {
    AppError::validation("id must be an integer")
}
