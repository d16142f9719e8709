//! HTTP handlers module
//!
//! Thin axum routers over the service layer: they deserialize input, call
//! exactly one service method and map the result to a status code. All
//! business rules live in the services.

pub mod admin;
pub mod public;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::database::{self, DatabasePool};
use crate::services::ServiceFactory;
use crate::utils::errors::EventBoardError;
use crate::utils::helpers::format_timestamp;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub pool: DatabasePool,
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public::routes())
        .merge(users::routes())
        .merge(admin::routes())
        .route("/health", get(health))
        .layer(middleware::from_fn(crate::middleware::logging::log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<&'static str, EventBoardError> {
    database::health_check(&state.pool).await?;
    Ok("OK")
}

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub status: String,
    pub reason: String,
    pub message: String,
    pub timestamp: String,
}

impl IntoResponse for EventBoardError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.is_conflict() {
            StatusCode::CONFLICT
        } else if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self, "Unhandled internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorMessage {
            status: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            reason: self.reason().to_string(),
            message: self.to_string(),
            timestamp: format_timestamp(Utc::now()),
        };

        (status, Json(body)).into_response()
    }
}

/// Split a comma-separated query value into typed ids
pub(crate) fn parse_id_list(raw: Option<&str>) -> Option<Vec<i64>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let ids = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect::<Vec<_>>();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list(None), None);
        assert_eq!(parse_id_list(Some("")), None);
        assert_eq!(parse_id_list(Some("1,2,3")), Some(vec![1, 2, 3]));
        assert_eq!(parse_id_list(Some(" 4 , 5 ")), Some(vec![4, 5]));
        assert_eq!(parse_id_list(Some("abc")), None);
    }

    #[test]
    fn test_error_status_mapping() {
        let resp = EventBoardError::EventNotFound { event_id: 1 }.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = EventBoardError::Conflict("dup".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = EventBoardError::Validation("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = EventBoardError::Config("x".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
