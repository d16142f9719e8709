//! Participation request model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Status of a participation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Confirmed => "CONFIRMED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    pub id: i64,
    pub event_id: i64,
    pub requester_id: i64,
    pub status: RequestStatus,
    pub created: DateTime<Utc>,
}

/// Target status for a bulk request-status update.
///
/// Only CONFIRMED and REJECTED are expressible; anything else is rejected
/// during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatusAction {
    Confirmed,
    Rejected,
}

/// Payload for the initiator's bulk status update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub request_ids: Vec<i64>,
    pub status: RequestStatusAction,
}

/// Post-mutation snapshot of an event's requests, grouped by status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResult {
    pub confirmed_requests: Vec<ParticipationRequest>,
    pub rejected_requests: Vec<ParticipationRequest>,
    pub pending_requests: Vec<ParticipationRequest>,
}
