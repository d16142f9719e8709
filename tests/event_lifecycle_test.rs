//! Integration tests for the event moderation lifecycle
//!
//! These tests need a live Postgres instance (`TEST_DATABASE_URL`); they
//! skip silently when none is available.

mod helpers;

use std::net::IpAddr;

use chrono::{Duration, Utc};
use serial_test::serial;

use EventBoard::models::event::{
    AdminStateAction, EventPatch, EventState, PublicEventFilter, UserStateAction,
};
use EventBoard::EventBoardError;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[tokio::test]
#[serial]
async fn test_created_event_is_pending_with_zero_counters() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;

    let event = services
        .event_service
        .create_event(user.id, helpers::new_event_request(category.id))
        .await
        .unwrap();

    assert_eq!(event.state, EventState::Pending);
    assert_eq!(event.confirmed_requests, 0);
    assert_eq!(event.views, 0);
    assert!(event.published_on.is_none());
    assert_eq!(event.initiator.id, user.id);
    assert_eq!(event.category.id, category.id);
}

#[tokio::test]
#[serial]
async fn test_event_date_must_be_two_hours_ahead() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;

    let mut request = helpers::new_event_request(category.id);
    request.event_date = Utc::now() + Duration::hours(1);

    let result = services.event_service.create_event(user.id, request).await;
    assert!(matches!(result, Err(EventBoardError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_noop_patch_leaves_event_unchanged() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let created = helpers::seed_event(&services, user.id, category.id, 10, true).await;

    let patched = services
        .event_service
        .update_event_by_initiator(user.id, created.id, EventPatch::default(), None)
        .await
        .unwrap();

    assert_eq!(patched.title, created.title);
    assert_eq!(patched.annotation, created.annotation);
    assert_eq!(patched.state, created.state);
    assert_eq!(patched.event_date, created.event_date);
    assert_eq!(patched.participant_limit, created.participant_limit);
    assert_eq!(patched.location.lat, created.location.lat);
}

#[tokio::test]
#[serial]
async fn test_initiator_cannot_touch_published_event() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;
    helpers::publish_event(&services, event.id).await;

    let patch = EventPatch {
        title: Some("New title".to_string()),
        ..Default::default()
    };
    let result = services
        .event_service
        .update_event_by_initiator(user.id, event.id, patch, None)
        .await;
    assert!(matches!(result, Err(EventBoardError::Conflict(_))));

    // state actions are blocked too
    let result = services
        .event_service
        .update_event_by_initiator(
            user.id,
            event.id,
            EventPatch::default(),
            Some(UserStateAction::CancelReview),
        )
        .await;
    assert!(matches!(result, Err(EventBoardError::Conflict(_))));
}

#[tokio::test]
#[serial]
async fn test_publish_stamps_timestamp_and_replay_conflicts() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;

    let published = helpers::publish_event(&services, event.id).await;
    assert_eq!(published.state, EventState::Published);
    let published_on = published.published_on.expect("published_on must be set");
    assert_eq!(published_on.timestamp_subsec_millis(), 0);

    // replaying the publish action is a conflict
    let result = services
        .event_service
        .update_event_by_admin(
            event.id,
            EventPatch::default(),
            Some(AdminStateAction::PublishEvent),
        )
        .await;
    assert!(matches!(result, Err(EventBoardError::Conflict(_))));
}

#[tokio::test]
#[serial]
async fn test_admin_cannot_reject_published_event() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;
    helpers::publish_event(&services, event.id).await;

    let result = services
        .event_service
        .update_event_by_admin(
            event.id,
            EventPatch::default(),
            Some(AdminStateAction::RejectEvent),
        )
        .await;
    assert!(matches!(result, Err(EventBoardError::Conflict(_))));
}

#[tokio::test]
#[serial]
async fn test_canceled_event_cannot_be_published() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;

    let canceled = services
        .event_service
        .update_event_by_initiator(
            user.id,
            event.id,
            EventPatch::default(),
            Some(UserStateAction::CancelReview),
        )
        .await
        .unwrap();
    assert_eq!(canceled.state, EventState::Canceled);

    let result = services
        .event_service
        .update_event_by_admin(
            event.id,
            EventPatch::default(),
            Some(AdminStateAction::PublishEvent),
        )
        .await;
    assert!(matches!(result, Err(EventBoardError::Conflict(_))));

    // but the initiator can send it back to review
    let pending = services
        .event_service
        .update_event_by_initiator(
            user.id,
            event.id,
            EventPatch::default(),
            Some(UserStateAction::SendToReview),
        )
        .await
        .unwrap();
    assert_eq!(pending.state, EventState::Pending);
}

#[tokio::test]
#[serial]
async fn test_published_read_misses_pending_events() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;

    let result = services.event_service.get_published_event(event.id).await;
    assert!(matches!(result, Err(EventBoardError::EventNotFound { .. })));

    helpers::publish_event(&services, event.id).await;
    let found = services.event_service.get_published_event(event.id).await.unwrap();
    assert_eq!(found.id, event.id);
}

#[tokio::test]
#[serial]
async fn test_views_count_once_per_address() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let event = helpers::seed_event(&services, user.id, category.id, 10, true).await;
    helpers::publish_event(&services, event.id).await;

    let first = services
        .event_service
        .get_public_event(event.id, ip("1.2.3.4"))
        .await
        .unwrap();
    assert_eq!(first.views, 1);

    let repeat = services
        .event_service
        .get_public_event(event.id, ip("1.2.3.4"))
        .await
        .unwrap();
    assert_eq!(repeat.views, 1);

    let other = services
        .event_service
        .get_public_event(event.id, ip("5.6.7.8"))
        .await
        .unwrap();
    assert_eq!(other.views, 2);
}

#[tokio::test]
#[serial]
async fn test_public_search_only_returns_published() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let user = helpers::seed_user(&services).await;
    let category = helpers::seed_category(&services).await;
    let pending = helpers::seed_event(&services, user.id, category.id, 10, true).await;
    let published = helpers::seed_event(&services, user.id, category.id, 10, true).await;
    helpers::publish_event(&services, published.id).await;

    let results = services
        .event_service
        .search_public(PublicEventFilter::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, published.id);
    assert!(results.iter().all(|e| e.id != pending.id));
}

#[tokio::test]
#[serial]
async fn test_public_search_rejects_inverted_range() {
    let Some(pool) = helpers::test_pool().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    helpers::reset(&pool).await;
    let services = helpers::build_services(pool);

    let filter = PublicEventFilter {
        range_start: Some(Utc::now()),
        range_end: Some(Utc::now() - Duration::days(1)),
        ..Default::default()
    };
    let result = services.event_service.search_public(filter).await;
    assert!(matches!(result, Err(EventBoardError::Validation(_))));
}
