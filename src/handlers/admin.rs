//! Admin (moderation) API handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::category::{Category, NewCategoryRequest};
use crate::models::compilation::{CompilationDto, NewCompilationRequest, UpdateCompilationRequest};
use crate::models::event::{
    AdminEventFilter, AdminStateAction, EventDto, EventPatch, EventState,
};
use crate::models::user::{NewUserRequest, User};
use crate::utils::errors::EventBoardError;

use super::{parse_id_list, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events", get(search_events))
        .route("/admin/events/:event_id", patch(update_event))
        .route("/admin/users", get(get_users).post(create_user))
        .route("/admin/users/:user_id", axum::routing::delete(delete_user))
        .route("/admin/categories", post(create_category))
        .route(
            "/admin/categories/:category_id",
            patch(update_category).delete(delete_category),
        )
        .route("/admin/compilations", post(create_compilation))
        .route(
            "/admin/compilations/:compilation_id",
            patch(update_compilation).delete(delete_compilation),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminSearchParams {
    /// Comma-separated initiator ids
    users: Option<String>,
    /// Comma-separated state names
    states: Option<String>,
    /// Comma-separated category ids
    categories: Option<String>,
    range_start: Option<DateTime<Utc>>,
    range_end: Option<DateTime<Utc>>,
    from: Option<i64>,
    size: Option<i64>,
}

async fn search_events(
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<Vec<EventDto>>, EventBoardError> {
    let filter = AdminEventFilter {
        users: parse_id_list(params.users.as_deref()),
        states: parse_state_list(params.states.as_deref())?,
        categories: parse_id_list(params.categories.as_deref()),
        range_start: params.range_start,
        range_end: params.range_end,
        from: params.from,
        size: params.size,
    };

    let events = state.services.event_service.search_admin(filter).await?;
    Ok(Json(events))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEventAdminRequest {
    #[serde(flatten)]
    patch: EventPatch,
    state_action: Option<AdminStateAction>,
}

async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(request): Json<UpdateEventAdminRequest>,
) -> Result<Json<EventDto>, EventBoardError> {
    let event = state
        .services
        .event_service
        .update_event_by_admin(event_id, request.patch, request.state_action)
        .await?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct UserListParams {
    /// Comma-separated user ids
    ids: Option<String>,
    from: Option<i64>,
    size: Option<i64>,
}

async fn get_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Vec<User>>, EventBoardError> {
    let users = state
        .services
        .user_service
        .get_users(parse_id_list(params.ids.as_deref()), params.from, params.size)
        .await?;
    Ok(Json(users))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), EventBoardError> {
    let user = state.services.user_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, EventBoardError> {
    state.services.user_service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<NewCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), EventBoardError> {
    let category = state.services.category_service.create_category(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(request): Json<NewCategoryRequest>,
) -> Result<Json<Category>, EventBoardError> {
    let category = state
        .services
        .category_service
        .update_category(category_id, request)
        .await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<StatusCode, EventBoardError> {
    state.services.category_service.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_compilation(
    State(state): State<AppState>,
    Json(request): Json<NewCompilationRequest>,
) -> Result<(StatusCode, Json<CompilationDto>), EventBoardError> {
    let compilation = state
        .services
        .compilation_service
        .create_compilation(request)
        .await?;
    Ok((StatusCode::CREATED, Json(compilation)))
}

async fn update_compilation(
    State(state): State<AppState>,
    Path(compilation_id): Path<i64>,
    Json(request): Json<UpdateCompilationRequest>,
) -> Result<Json<CompilationDto>, EventBoardError> {
    let compilation = state
        .services
        .compilation_service
        .update_compilation(compilation_id, request)
        .await?;
    Ok(Json(compilation))
}

async fn delete_compilation(
    State(state): State<AppState>,
    Path(compilation_id): Path<i64>,
) -> Result<StatusCode, EventBoardError> {
    state
        .services
        .compilation_service
        .delete_compilation(compilation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse a comma-separated list of event state names
fn parse_state_list(raw: Option<&str>) -> Result<Option<Vec<EventState>>, EventBoardError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let mut states = Vec::new();
    for part in raw.split(',') {
        let state = match part.trim().to_uppercase().as_str() {
            "PENDING" => EventState::Pending,
            "PUBLISHED" => EventState::Published,
            "CANCELED" => EventState::Canceled,
            other => {
                return Err(EventBoardError::Validation(format!(
                    "Unknown event state: {}",
                    other
                )))
            }
        };
        states.push(state);
    }
    Ok(Some(states))
}
