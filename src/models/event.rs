//! Event model and moderation state machine types

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::category::Category;
use crate::models::user::UserShortDto;

/// Moderation state of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_state", rename_all = "UPPERCASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State actions available to an event's initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStateAction {
    SendToReview,
    CancelReview,
}

/// State actions available to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStateAction {
    PublishEvent,
    RejectEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub initiator_id: i64,
    pub location_id: i64,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub confirmed_requests: i64,
    pub views: i64,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
}

impl Event {
    /// Apply a partial patch: absent fields leave the current value untouched.
    ///
    /// Location replacement is handled by the caller, which owns inserting
    /// the new location row before the update is persisted.
    pub fn apply_patch(&mut self, patch: &EventPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref annotation) = patch.annotation {
            self.annotation = annotation.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(category) = patch.category {
            self.category_id = category;
        }
        if let Some(event_date) = patch.event_date {
            self.event_date = event_date;
        }
        if let Some(paid) = patch.paid {
            self.paid = paid;
        }
        if let Some(limit) = patch.participant_limit {
            self.participant_limit = limit;
        }
        if let Some(moderation) = patch.request_moderation {
            self.request_moderation = moderation;
        }
    }

    /// Whether the event has free capacity for another confirmed participant
    pub fn has_capacity(&self) -> bool {
        self.participant_limit == 0 || self.confirmed_requests < self.participant_limit as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lon: f64,
}

/// Payload for creating a new event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: i64,
    pub event_date: DateTime<Utc>,
    pub location: LocationDto,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
}

/// Partial event update; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub annotation: Option<String>,
    pub description: Option<String>,
    pub category: Option<i64>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<LocationDto>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
}

/// Sort order for public event search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    EventDate,
    Views,
}

/// Public search parameters; absent fields mean "no filter"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicEventFilter {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub only_available: bool,
    pub sort: Option<EventSort>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Admin search parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminEventFilter {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Event row joined with its category, initiator and location
#[derive(Debug, Clone, FromRow)]
pub struct EventDetails {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category_id: i64,
    pub category_name: String,
    pub initiator_id: i64,
    pub initiator_name: String,
    pub lat: f64,
    pub lon: f64,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub confirmed_requests: i64,
    pub views: i64,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
}

/// Full event representation returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    pub title: String,
    pub annotation: String,
    pub description: String,
    pub category: Category,
    pub initiator: UserShortDto,
    pub location: LocationDto,
    pub event_date: DateTime<Utc>,
    pub paid: bool,
    pub participant_limit: i32,
    pub request_moderation: bool,
    pub confirmed_requests: i64,
    pub views: i64,
    pub state: EventState,
    pub created_on: DateTime<Utc>,
    pub published_on: Option<DateTime<Utc>>,
}

impl From<EventDetails> for EventDto {
    fn from(details: EventDetails) -> Self {
        EventDto {
            id: details.id,
            title: details.title,
            annotation: details.annotation,
            description: details.description,
            category: Category {
                id: details.category_id,
                name: details.category_name,
            },
            initiator: UserShortDto {
                id: details.initiator_id,
                name: details.initiator_name,
            },
            location: LocationDto {
                lat: details.lat,
                lon: details.lon,
            },
            event_date: details.event_date,
            paid: details.paid,
            participant_limit: details.participant_limit,
            request_moderation: details.request_moderation,
            confirmed_requests: details.confirmed_requests,
            views: details.views,
            state: details.state,
            created_on: details.created_on,
            published_on: details.published_on,
        }
    }
}
