//! Event repository implementation
//!
//! Counters (`confirmed_requests`, `views`) are only ever written through the
//! dedicated atomic statements in this module; the full-row `update` excludes
//! them so a field patch can never clobber a concurrent counter change.

use sqlx::{PgPool, Postgres, QueryBuilder};
use chrono::{DateTime, Utc};
use crate::models::event::{
    AdminEventFilter, Event, EventDetails, EventSort, Location, LocationDto, NewEventRequest,
    PublicEventFilter,
};
use crate::utils::errors::EventBoardError;

/// Joined projection shared by every details/search query
const DETAILS_SELECT: &str = r#"
SELECT e.id, e.title, e.annotation, e.description,
       e.category_id, c.name AS category_name,
       e.initiator_id, u.name AS initiator_name,
       l.lat, l.lon,
       e.event_date, e.paid, e.participant_limit, e.request_moderation,
       e.confirmed_requests, e.views, e.state, e.created_on, e.published_on
FROM events e
JOIN categories c ON c.id = e.category_id
JOIN users u ON u.id = e.initiator_id
JOIN locations l ON l.id = e.location_id
"#;

const EVENT_COLUMNS: &str = "id, title, annotation, description, category_id, initiator_id, \
     location_id, event_date, paid, participant_limit, request_moderation, \
     confirmed_requests, views, state, created_on, published_on";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a location row; locations are replaced, never updated in place
    pub async fn create_location(&self, location: LocationDto) -> Result<Location, EventBoardError> {
        let location = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (lat, lon) VALUES ($1, $2) RETURNING id, lat, lon"
        )
        .bind(location.lat)
        .bind(location.lon)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    /// Create a new event in PENDING state with zeroed counters
    pub async fn create(
        &self,
        request: &NewEventRequest,
        initiator_id: i64,
        location_id: i64,
    ) -> Result<Event, EventBoardError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, annotation, description, category_id, initiator_id,
                                location_id, event_date, paid, participant_limit,
                                request_moderation, confirmed_requests, views, state, created_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, 0, 'PENDING', $11)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&request.title)
        .bind(&request.annotation)
        .bind(&request.description)
        .bind(request.category)
        .bind(initiator_id)
        .bind(location_id)
        .bind(request.event_date)
        .bind(request.paid.unwrap_or(false))
        .bind(request.participant_limit.unwrap_or(0))
        .bind(request.request_moderation.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventBoardError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID scoped to its initiator
    pub async fn find_by_id_and_initiator(
        &self,
        id: i64,
        initiator_id: i64,
    ) -> Result<Option<Event>, EventBoardError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND initiator_id = $2"
        ))
        .bind(id)
        .bind(initiator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID only if it is published
    pub async fn find_published(&self, id: i64) -> Result<Option<Event>, EventBoardError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND state = 'PUBLISHED'"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Joined details for a single event
    pub async fn find_details(&self, id: i64) -> Result<Option<EventDetails>, EventBoardError> {
        let details = sqlx::query_as::<_, EventDetails>(
            &format!("{DETAILS_SELECT} WHERE e.id = $1")
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    /// Joined details for a set of events, in the given id order
    pub async fn find_details_by_ids(
        &self,
        ids: &[i64],
    ) -> Result<Vec<EventDetails>, EventBoardError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = sqlx::query_as::<_, EventDetails>(
            &format!("{DETAILS_SELECT} WHERE e.id = ANY($1)")
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.sort_by_key(|row| ids.iter().position(|id| *id == row.id));
        Ok(rows)
    }

    /// Events created by an initiator, newest first
    pub async fn find_by_initiator(
        &self,
        initiator_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventDetails>, EventBoardError> {
        let events = sqlx::query_as::<_, EventDetails>(&format!(
            "{DETAILS_SELECT} WHERE e.initiator_id = $1 ORDER BY e.id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(initiator_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Persist the patchable fields and moderation state of an event.
    ///
    /// `confirmed_requests` and `views` are deliberately absent here.
    pub async fn update(&self, event: &Event) -> Result<Event, EventBoardError> {
        let updated = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                annotation = $3,
                description = $4,
                category_id = $5,
                location_id = $6,
                event_date = $7,
                paid = $8,
                participant_limit = $9,
                request_moderation = $10,
                state = $11,
                published_on = $12
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.category_id)
        .bind(event.location_id)
        .bind(event.event_date)
        .bind(event.paid)
        .bind(event.participant_limit)
        .bind(event.request_moderation)
        .bind(event.state)
        .bind(event.published_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Atomically take one unit of capacity.
    ///
    /// Returns false when the participant limit is already reached, in which
    /// case nothing was changed. Zero limit means unlimited capacity.
    pub async fn try_increment_confirmed(&self, id: i64) -> Result<bool, EventBoardError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET confirmed_requests = confirmed_requests + 1
            WHERE id = $1
              AND (participant_limit = 0 OR confirmed_requests < participant_limit)
            "#
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Release one unit of capacity, never going below zero
    pub async fn decrement_confirmed(&self, id: i64) -> Result<(), EventBoardError> {
        sqlx::query(
            r#"
            UPDATE events
            SET confirmed_requests = confirmed_requests - 1
            WHERE id = $1 AND confirmed_requests > 0
            "#
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Increment the view counter and return the updated event
    pub async fn increment_views(&self, id: i64) -> Result<Event, EventBoardError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET views = views + 1 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Whether any event references the category
    pub async fn exists_by_category(&self, category_id: i64) -> Result<bool, EventBoardError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE category_id = $1"
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    /// Public search over published events, composed from optional predicates
    pub async fn search_public(
        &self,
        filter: &PublicEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventDetails>, EventBoardError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE e.state = 'PUBLISHED'");

        // blank text means no filter
        if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", text);
            qb.push(" AND (e.annotation ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR e.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(categories) = filter.categories.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND e.category_id = ANY(");
            qb.push_bind(categories.to_vec());
            qb.push(")");
        }

        if let Some(paid) = filter.paid {
            qb.push(" AND e.paid = ");
            qb.push_bind(paid);
        }

        push_date_range(&mut qb, filter.range_start, filter.range_end);

        if filter.only_available {
            qb.push(" AND (e.participant_limit = 0 OR e.confirmed_requests < e.participant_limit)");
        }

        match filter.sort {
            Some(EventSort::Views) => qb.push(" ORDER BY e.views DESC"),
            _ => qb.push(" ORDER BY e.event_date DESC"),
        };

        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let events = qb.build_query_as::<EventDetails>().fetch_all(&self.pool).await?;
        Ok(events)
    }

    /// Admin search over all events regardless of state
    pub async fn search_admin(
        &self,
        filter: &AdminEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventDetails>, EventBoardError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE TRUE");

        if let Some(users) = filter.users.as_deref().filter(|u| !u.is_empty()) {
            qb.push(" AND e.initiator_id = ANY(");
            qb.push_bind(users.to_vec());
            qb.push(")");
        }

        if let Some(states) = filter.states.as_deref().filter(|s| !s.is_empty()) {
            let names: Vec<String> = states.iter().map(|s| s.as_str().to_string()).collect();
            qb.push(" AND e.state::text = ANY(");
            qb.push_bind(names);
            qb.push(")");
        }

        if let Some(categories) = filter.categories.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND e.category_id = ANY(");
            qb.push_bind(categories.to_vec());
            qb.push(")");
        }

        push_date_range(&mut qb, filter.range_start, filter.range_end);

        qb.push(" ORDER BY e.id ASC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let events = qb.build_query_as::<EventDetails>().fetch_all(&self.pool).await?;
        Ok(events)
    }
}

fn push_date_range(
    qb: &mut QueryBuilder<Postgres>,
    range_start: Option<DateTime<Utc>>,
    range_end: Option<DateTime<Utc>>,
) {
    if let Some(start) = range_start {
        qb.push(" AND e.event_date >= ");
        qb.push_bind(start);
    }
    if let Some(end) = range_end {
        qb.push(" AND e.event_date <= ");
        qb.push_bind(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_sql(filter: &PublicEventFilter) -> String {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        qb.push(" WHERE e.state = 'PUBLISHED'");
        if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", text);
            qb.push(" AND (e.annotation ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR e.description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        qb.into_sql()
    }

    #[test]
    fn test_blank_text_drops_predicate() {
        let no_text = public_sql(&PublicEventFilter::default());
        let blank = public_sql(&PublicEventFilter {
            text: Some("   ".to_string()),
            ..Default::default()
        });
        assert_eq!(no_text, blank);
        assert!(!blank.contains("ILIKE"));
    }

    #[test]
    fn test_text_predicate_matches_annotation_and_description() {
        let sql = public_sql(&PublicEventFilter {
            text: Some("jazz".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("e.annotation ILIKE"));
        assert!(sql.contains("e.description ILIKE"));
    }
}
