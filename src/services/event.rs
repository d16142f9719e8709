//! Event lifecycle service
//!
//! This service owns the event moderation state machine: creation, partial
//! patches by the initiator and by admins, the resulting state transitions,
//! published reads with per-IP view counting, and filtered search.

use std::net::IpAddr;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::database::repositories::{CategoryRepository, EventRepository, UserRepository};
use crate::models::event::{
    AdminEventFilter, AdminStateAction, Event, EventDto, EventPatch, EventState, NewEventRequest,
    PublicEventFilter, UserStateAction,
};
use crate::state::ViewTracker;
use crate::utils::errors::{EventBoardError, Result};
use crate::utils::helpers::truncate_to_seconds;

/// Minimum lead time between "now" and an event's start
const MIN_LEAD_TIME_HOURS: i64 = 2;

/// Default page size for listings
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Event service for managing the event lifecycle
#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
    categories: CategoryRepository,
    users: UserRepository,
    views: ViewTracker,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(
        events: EventRepository,
        categories: CategoryRepository,
        users: UserRepository,
        views: ViewTracker,
    ) -> Self {
        Self {
            events,
            categories,
            users,
            views,
        }
    }

    /// Submit a new event; it starts out PENDING with zeroed counters
    pub async fn create_event(&self, user_id: i64, request: NewEventRequest) -> Result<EventDto> {
        debug!(user_id = user_id, title = %request.title, "Creating event");

        validate_event_date(request.event_date)?;
        validate_participant_limit(request.participant_limit)?;

        self.categories
            .find_by_id(request.category)
            .await?
            .ok_or(EventBoardError::CategoryNotFound { category_id: request.category })?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(EventBoardError::UserNotFound { user_id })?;

        let location = self.events.create_location(request.location).await?;
        let event = self.events.create(&request, user_id, location.id).await?;

        info!(event_id = event.id, user_id = user_id, "Event created");
        self.details_dto(event.id).await
    }

    /// Events created by a user, paginated
    pub async fn get_user_events(
        &self,
        user_id: i64,
        from: Option<i64>,
        size: Option<i64>,
    ) -> Result<Vec<EventDto>> {
        let (limit, offset) = page(from, size)?;
        let events = self.events.find_by_initiator(user_id, limit, offset).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    /// Single event scoped to its initiator
    pub async fn get_user_event(&self, user_id: i64, event_id: i64) -> Result<EventDto> {
        self.events
            .find_by_id_and_initiator(event_id, user_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;
        self.details_dto(event_id).await
    }

    /// Patch an event as its initiator.
    ///
    /// Published events are immutable for the initiator. SEND_TO_REVIEW and
    /// CANCEL_REVIEW force the state to PENDING and CANCELED respectively;
    /// an absent action leaves the state as it was.
    pub async fn update_event_by_initiator(
        &self,
        user_id: i64,
        event_id: i64,
        patch: EventPatch,
        action: Option<UserStateAction>,
    ) -> Result<EventDto> {
        debug!(user_id = user_id, event_id = event_id, action = ?action, "Initiator event patch");

        let mut event = self
            .events
            .find_by_id_and_initiator(event_id, user_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;

        if event.state == EventState::Published {
            return Err(EventBoardError::Conflict(
                "Cannot modify a published event".to_string(),
            ));
        }

        self.validate_patch(&patch).await?;
        self.apply_patch_with_location(&mut event, &patch).await?;
        event.state = resolve_initiator_state(event.state, action);

        let updated = self.events.update(&event).await?;
        info!(event_id = updated.id, user_id = user_id, state = %updated.state, "Event patched by initiator");
        self.details_dto(updated.id).await
    }

    /// Patch an event as an admin.
    ///
    /// PUBLISH_EVENT is only valid from PENDING and stamps `published_on`
    /// exactly once; REJECT_EVENT is valid from any state except PUBLISHED.
    pub async fn update_event_by_admin(
        &self,
        event_id: i64,
        patch: EventPatch,
        action: Option<AdminStateAction>,
    ) -> Result<EventDto> {
        debug!(event_id = event_id, action = ?action, "Admin event patch");

        let mut event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;

        self.validate_patch(&patch).await?;
        self.apply_patch_with_location(&mut event, &patch).await?;

        let (state, stamp_published) = resolve_admin_state(event.state, action)?;
        event.state = state;
        if stamp_published {
            event.published_on = Some(truncate_to_seconds(Utc::now()));
        }

        let updated = self.events.update(&event).await?;
        info!(event_id = updated.id, state = %updated.state, "Event patched by admin");
        self.details_dto(updated.id).await
    }

    /// Published event by id; anything else is treated as absent
    pub async fn get_published_event(&self, event_id: i64) -> Result<EventDto> {
        self.events
            .find_published(event_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;
        self.details_dto(event_id).await
    }

    /// Published event by id, counting the view once per viewer address
    pub async fn get_public_event(&self, event_id: i64, ip: IpAddr) -> Result<EventDto> {
        let event = self
            .events
            .find_published(event_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;

        if self.views.first_view(event.id, ip) {
            self.events.increment_views(event.id).await?;
            debug!(event_id = event.id, ip = %ip, "View counted");
        }

        self.details_dto(event_id).await
    }

    /// Public search over published events
    pub async fn search_public(&self, filter: PublicEventFilter) -> Result<Vec<EventDto>> {
        if let (Some(start), Some(end)) = (filter.range_start, filter.range_end) {
            if end < start {
                return Err(EventBoardError::Validation(
                    "range_end must not be before range_start".to_string(),
                ));
            }
        }

        let (limit, offset) = page(filter.from, filter.size)?;
        let events = self.events.search_public(&filter, limit, offset).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    /// Admin search over all events
    pub async fn search_admin(&self, filter: AdminEventFilter) -> Result<Vec<EventDto>> {
        let (limit, offset) = page(filter.from, filter.size)?;
        let events = self.events.search_admin(&filter, limit, offset).await?;
        Ok(events.into_iter().map(EventDto::from).collect())
    }

    /// Validate patch fields that do not depend on the stored event
    async fn validate_patch(&self, patch: &EventPatch) -> Result<()> {
        if let Some(event_date) = patch.event_date {
            validate_event_date(event_date)?;
        }
        validate_participant_limit(patch.participant_limit)?;
        if let Some(category_id) = patch.category {
            self.categories
                .find_by_id(category_id)
                .await?
                .ok_or(EventBoardError::CategoryNotFound { category_id })?;
        }
        Ok(())
    }

    /// Apply the patch, replacing the location row when one is supplied
    async fn apply_patch_with_location(
        &self,
        event: &mut Event,
        patch: &EventPatch,
    ) -> Result<()> {
        event.apply_patch(patch);
        if let Some(location) = patch.location {
            let stored = self.events.create_location(location).await?;
            event.location_id = stored.id;
        }
        Ok(())
    }

    async fn details_dto(&self, event_id: i64) -> Result<EventDto> {
        let details = self
            .events
            .find_details(event_id)
            .await?
            .ok_or(EventBoardError::EventNotFound { event_id })?;
        Ok(details.into())
    }
}

/// State resolution for initiator actions; PUBLISHED is guarded by the caller
fn resolve_initiator_state(current: EventState, action: Option<UserStateAction>) -> EventState {
    match action {
        Some(UserStateAction::SendToReview) => EventState::Pending,
        Some(UserStateAction::CancelReview) => EventState::Canceled,
        None => current,
    }
}

/// State resolution for admin actions.
///
/// Returns the new state and whether `published_on` must be stamped.
fn resolve_admin_state(
    current: EventState,
    action: Option<AdminStateAction>,
) -> Result<(EventState, bool)> {
    match action {
        Some(AdminStateAction::PublishEvent) => match current {
            EventState::Pending => Ok((EventState::Published, true)),
            EventState::Published | EventState::Canceled => Err(EventBoardError::Conflict(
                format!("Cannot publish an event in state {}", current),
            )),
        },
        Some(AdminStateAction::RejectEvent) => {
            if current == EventState::Published {
                Err(EventBoardError::Conflict(
                    "Cannot reject an already published event".to_string(),
                ))
            } else {
                Ok((EventState::Canceled, false))
            }
        }
        None => Ok((current, false)),
    }
}

/// Events must start strictly more than the minimum lead time from now
fn validate_event_date(event_date: DateTime<Utc>) -> Result<()> {
    let threshold = truncate_to_seconds(Utc::now()) + Duration::hours(MIN_LEAD_TIME_HOURS);
    if event_date <= threshold {
        return Err(EventBoardError::Validation(format!(
            "event date must be at least {} hours in the future",
            MIN_LEAD_TIME_HOURS
        )));
    }
    Ok(())
}

fn validate_participant_limit(limit: Option<i32>) -> Result<()> {
    if let Some(limit) = limit {
        if limit < 0 {
            return Err(EventBoardError::Validation(
                "participant limit cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Translate from/size paging parameters into LIMIT/OFFSET
fn page(from: Option<i64>, size: Option<i64>) -> Result<(i64, i64)> {
    let offset = from.unwrap_or(0);
    let limit = size.unwrap_or(DEFAULT_PAGE_SIZE);
    if offset < 0 || limit <= 0 {
        return Err(EventBoardError::Validation(
            "paging parameters must be non-negative".to_string(),
        ));
    }
    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_initiator_actions_force_state() {
        assert_eq!(
            resolve_initiator_state(EventState::Canceled, Some(UserStateAction::SendToReview)),
            EventState::Pending
        );
        assert_eq!(
            resolve_initiator_state(EventState::Pending, Some(UserStateAction::CancelReview)),
            EventState::Canceled
        );
    }

    #[test]
    fn test_absent_initiator_action_keeps_state() {
        for state in [EventState::Pending, EventState::Canceled] {
            assert_eq!(resolve_initiator_state(state, None), state);
        }
    }

    #[test]
    fn test_publish_from_pending_stamps_timestamp() {
        let (state, stamp) =
            resolve_admin_state(EventState::Pending, Some(AdminStateAction::PublishEvent)).unwrap();
        assert_eq!(state, EventState::Published);
        assert!(stamp);
    }

    #[test]
    fn test_publish_is_rejected_from_terminal_states() {
        for state in [EventState::Published, EventState::Canceled] {
            let result = resolve_admin_state(state, Some(AdminStateAction::PublishEvent));
            assert_matches!(result, Err(EventBoardError::Conflict(_)));
        }
    }

    #[test]
    fn test_reject_is_rejected_once_published() {
        let result = resolve_admin_state(EventState::Published, Some(AdminStateAction::RejectEvent));
        assert_matches!(result, Err(EventBoardError::Conflict(_)));
    }

    #[test]
    fn test_reject_cancels_pending_and_canceled() {
        for state in [EventState::Pending, EventState::Canceled] {
            let (next, stamp) =
                resolve_admin_state(state, Some(AdminStateAction::RejectEvent)).unwrap();
            assert_eq!(next, EventState::Canceled);
            assert!(!stamp);
        }
    }

    #[test]
    fn test_absent_admin_action_keeps_state() {
        for state in [EventState::Pending, EventState::Published, EventState::Canceled] {
            let (next, stamp) = resolve_admin_state(state, None).unwrap();
            assert_eq!(next, state);
            assert!(!stamp);
        }
    }

    #[test]
    fn test_event_date_lead_time() {
        assert!(validate_event_date(Utc::now() + Duration::hours(3)).is_ok());
        assert_matches!(
            validate_event_date(Utc::now() + Duration::hours(1)),
            Err(EventBoardError::Validation(_))
        );
        // exactly at the threshold is still too soon
        assert_matches!(
            validate_event_date(truncate_to_seconds(Utc::now()) + Duration::hours(2)),
            Err(EventBoardError::Validation(_))
        );
    }

    #[test]
    fn test_negative_participant_limit_rejected() {
        assert!(validate_participant_limit(None).is_ok());
        assert!(validate_participant_limit(Some(0)).is_ok());
        assert_matches!(
            validate_participant_limit(Some(-1)),
            Err(EventBoardError::Validation(_))
        );
    }

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(page(None, None).unwrap(), (10, 0));
        assert_eq!(page(Some(20), Some(5)).unwrap(), (5, 20));
        assert_matches!(page(Some(-1), None), Err(EventBoardError::Validation(_)));
        assert_matches!(page(None, Some(0)), Err(EventBoardError::Validation(_)));
    }
}
