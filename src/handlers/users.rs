//! Private (initiator/requester) API handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use crate::models::event::{EventDto, EventPatch, NewEventRequest, UserStateAction};
use crate::models::request::{ParticipationRequest, StatusUpdateRequest, StatusUpdateResult};
use crate::utils::errors::EventBoardError;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/events",
            get(get_user_events).post(create_event),
        )
        .route(
            "/users/:user_id/events/:event_id",
            get(get_user_event).patch(update_event),
        )
        .route(
            "/users/:user_id/events/:event_id/requests",
            get(get_event_requests).patch(update_request_statuses),
        )
        .route(
            "/users/:user_id/requests",
            get(get_user_requests).post(create_request),
        )
        .route(
            "/users/:user_id/requests/:request_id/cancel",
            patch(cancel_request),
        )
}

#[derive(Debug, Deserialize)]
struct PageParams {
    from: Option<i64>,
    size: Option<i64>,
}

async fn get_user_events(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<EventDto>>, EventBoardError> {
    let events = state
        .services
        .event_service
        .get_user_events(user_id, params.from, params.size)
        .await?;
    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<NewEventRequest>,
) -> Result<(StatusCode, Json<EventDto>), EventBoardError> {
    let event = state.services.event_service.create_event(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_user_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventDto>, EventBoardError> {
    let event = state
        .services
        .event_service
        .get_user_event(user_id, event_id)
        .await?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEventUserRequest {
    #[serde(flatten)]
    patch: EventPatch,
    state_action: Option<UserStateAction>,
}

async fn update_event(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateEventUserRequest>,
) -> Result<Json<EventDto>, EventBoardError> {
    let event = state
        .services
        .event_service
        .update_event_by_initiator(user_id, event_id, request.patch, request.state_action)
        .await?;
    Ok(Json(event))
}

async fn get_event_requests(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<ParticipationRequest>>, EventBoardError> {
    let requests = state
        .services
        .request_service
        .get_event_requests(user_id, event_id)
        .await?;
    Ok(Json(requests))
}

async fn update_request_statuses(
    State(state): State<AppState>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResult>, EventBoardError> {
    let result = state
        .services
        .request_service
        .update_request_statuses(user_id, event_id, request)
        .await?;
    Ok(Json(result))
}

async fn get_user_requests(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<ParticipationRequest>>, EventBoardError> {
    let requests = state.services.request_service.get_user_requests(user_id).await?;
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventIdParam {
    event_id: i64,
}

async fn create_request(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<EventIdParam>,
) -> Result<(StatusCode, Json<ParticipationRequest>), EventBoardError> {
    let request = state
        .services
        .request_service
        .create_request(user_id, params.event_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn cancel_request(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<ParticipationRequest>, EventBoardError> {
    let request = state
        .services
        .request_service
        .cancel_request(user_id, request_id)
        .await?;
    Ok(Json(request))
}
