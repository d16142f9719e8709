//! Test data helpers
//!
//! Builders and seed functions for users, categories and events used by the
//! integration tests.

use chrono::{Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use sqlx::PgPool;

use EventBoard::config::Settings;
use EventBoard::database::DatabaseService;
use EventBoard::models::category::{Category, NewCategoryRequest};
use EventBoard::models::event::{
    AdminStateAction, EventDto, EventPatch, LocationDto, NewEventRequest,
};
use EventBoard::models::user::{NewUserRequest, User};
use EventBoard::services::ServiceFactory;
use EventBoard::state::ViewTracker;

/// Build the full service stack over a test pool
pub fn build_services(pool: PgPool) -> ServiceFactory {
    let settings = Settings::default();
    let database = DatabaseService::new(pool);
    ServiceFactory::new(&settings, &database, ViewTracker::new())
        .expect("failed to build services")
}

/// Create a user with generated name and email
pub async fn seed_user(services: &ServiceFactory) -> User {
    let request = NewUserRequest {
        name: Name().fake(),
        email: SafeEmail().fake(),
    };
    services
        .user_service
        .create_user(request)
        .await
        .expect("failed to seed user")
}

/// Create a category with a generated name
pub async fn seed_category(services: &ServiceFactory) -> Category {
    let request = NewCategoryRequest {
        name: format!("category-{}", uuid()),
    };
    services
        .category_service
        .create_category(request)
        .await
        .expect("failed to seed category")
}

/// Well-formed event payload starting three hours from now
pub fn new_event_request(category_id: i64) -> NewEventRequest {
    NewEventRequest {
        title: "Swing social".to_string(),
        annotation: "An open social dance evening for dancers of all levels".to_string(),
        description: "Expect a warm-up taster class, social dancing until late \
                      and a friendly crowd."
            .to_string(),
        category: category_id,
        event_date: Utc::now() + Duration::hours(3),
        location: LocationDto {
            lat: 59.9343,
            lon: 30.3351,
        },
        paid: Some(false),
        participant_limit: Some(0),
        request_moderation: Some(true),
    }
}

/// Create an event with the given limit/moderation settings
pub async fn seed_event(
    services: &ServiceFactory,
    initiator_id: i64,
    category_id: i64,
    participant_limit: i32,
    request_moderation: bool,
) -> EventDto {
    let mut request = new_event_request(category_id);
    request.participant_limit = Some(participant_limit);
    request.request_moderation = Some(request_moderation);
    services
        .event_service
        .create_event(initiator_id, request)
        .await
        .expect("failed to seed event")
}

/// Publish a pending event through the admin patch
pub async fn publish_event(services: &ServiceFactory, event_id: i64) -> EventDto {
    services
        .event_service
        .update_event_by_admin(
            event_id,
            EventPatch::default(),
            Some(AdminStateAction::PublishEvent),
        )
        .await
        .expect("failed to publish event")
}

fn uuid() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}",
        COUNTER.fetch_add(1, Ordering::Relaxed),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}
