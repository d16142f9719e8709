//! Public (unauthenticated) API handlers

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::category::Category;
use crate::models::compilation::CompilationDto;
use crate::models::event::{EventDto, EventSort, PublicEventFilter};
use crate::utils::errors::EventBoardError;

use super::{parse_id_list, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(search_events))
        .route("/events/:event_id", get(get_event))
        .route("/categories", get(list_categories))
        .route("/categories/:category_id", get(get_category))
        .route("/compilations", get(list_compilations))
        .route("/compilations/:compilation_id", get(get_compilation))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicSearchParams {
    text: Option<String>,
    /// Comma-separated category ids
    categories: Option<String>,
    paid: Option<bool>,
    range_start: Option<DateTime<Utc>>,
    range_end: Option<DateTime<Utc>>,
    #[serde(default)]
    only_available: bool,
    sort: Option<EventSort>,
    from: Option<i64>,
    size: Option<i64>,
}

async fn search_events(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(params): Query<PublicSearchParams>,
) -> Result<Json<Vec<EventDto>>, EventBoardError> {
    let filter = PublicEventFilter {
        text: params.text,
        categories: parse_id_list(params.categories.as_deref()),
        paid: params.paid,
        range_start: params.range_start,
        range_end: params.range_end,
        only_available: params.only_available,
        sort: params.sort,
        from: params.from,
        size: params.size,
    };

    let events = state.services.event_service.search_public(filter).await?;
    record_hit(&state, "/events".to_string(), addr);
    Ok(Json(events))
}

async fn get_event(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventDto>, EventBoardError> {
    let event = state
        .services
        .event_service
        .get_public_event(event_id, addr.ip())
        .await?;
    record_hit(&state, format!("/events/{}", event_id), addr);
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
struct PageParams {
    from: Option<i64>,
    size: Option<i64>,
}

async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Category>>, EventBoardError> {
    let categories = state
        .services
        .category_service
        .get_categories(params.from, params.size)
        .await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<Category>, EventBoardError> {
    let category = state.services.category_service.get_category(category_id).await?;
    Ok(Json(category))
}

#[derive(Debug, Deserialize)]
struct CompilationParams {
    pinned: Option<bool>,
    from: Option<i64>,
    size: Option<i64>,
}

async fn list_compilations(
    State(state): State<AppState>,
    Query(params): Query<CompilationParams>,
) -> Result<Json<Vec<CompilationDto>>, EventBoardError> {
    let compilations = state
        .services
        .compilation_service
        .get_compilations(params.pinned, params.from, params.size)
        .await?;
    Ok(Json(compilations))
}

async fn get_compilation(
    State(state): State<AppState>,
    Path(compilation_id): Path<i64>,
) -> Result<Json<CompilationDto>, EventBoardError> {
    let compilation = state
        .services
        .compilation_service
        .get_compilation(compilation_id)
        .await?;
    Ok(Json(compilation))
}

/// Forward a hit to the statistics service without blocking the response
fn record_hit(state: &AppState, uri: String, addr: SocketAddr) {
    let stats = state.services.stats_client.clone();
    tokio::spawn(async move {
        stats.record_hit(&uri, &addr.ip().to_string()).await;
    });
}
