//! Participation request repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::request::{ParticipationRequest, RequestStatus};
use crate::utils::errors::EventBoardError;

const REQUEST_COLUMNS: &str = "id, event_id, requester_id, status, created";

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new participation request
    pub async fn create(
        &self,
        requester_id: i64,
        event_id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EventBoardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            r#"
            INSERT INTO requests (event_id, requester_id, status, created)
            VALUES ($1, $2, $3, $4)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(requester_id)
        .bind(status)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Find request by ID
    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<ParticipationRequest>, EventBoardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Find request by ID scoped to its requester
    pub async fn find_by_id_and_requester(
        &self,
        id: i64,
        requester_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventBoardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1 AND requester_id = $2"
        ))
        .bind(id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Find a requester's non-canceled request for an event, if any.
    ///
    /// Canceled requests do not block a new one.
    pub async fn find_active_by_requester_and_event(
        &self,
        requester_id: i64,
        event_id: i64,
    ) -> Result<Option<ParticipationRequest>, EventBoardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM requests
            WHERE requester_id = $1 AND event_id = $2 AND status <> 'CANCELED'
            ORDER BY created DESC
            LIMIT 1
            "#
        ))
        .bind(requester_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// All requests made by a user, newest first
    pub async fn find_by_requester(
        &self,
        requester_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventBoardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE requester_id = $1 ORDER BY created DESC"
        ))
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Requests matching both the id set and the event; non-matching ids are
    /// silently absent from the result
    pub async fn find_by_ids_and_event(
        &self,
        ids: &[i64],
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventBoardError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ANY($1) AND event_id = $2"
        ))
        .bind(ids)
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// All requests for an event
    pub async fn find_by_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, EventBoardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE event_id = $1 ORDER BY created ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Requests for an event in a given status
    pub async fn find_by_event_and_status(
        &self,
        event_id: i64,
        status: RequestStatus,
    ) -> Result<Vec<ParticipationRequest>, EventBoardError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM requests
            WHERE event_id = $1 AND status = $2
            ORDER BY created ASC
            "#
        ))
        .bind(event_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Update a request's status
    pub async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, EventBoardError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "UPDATE requests SET status = $2 WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}
