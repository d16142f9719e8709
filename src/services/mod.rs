//! Services module
//!
//! This module contains business logic services

pub mod category;
pub mod compilation;
pub mod event;
pub mod request;
pub mod stats;
pub mod user;

// Re-export commonly used services
pub use category::CategoryService;
pub use compilation::CompilationService;
pub use event::EventService;
pub use request::RequestService;
pub use stats::{EndpointHit, StatsClient};
pub use user::UserService;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::state::ViewTracker;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub request_service: RequestService,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub compilation_service: CompilationService,
    pub stats_client: StatsClient,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: &Settings,
        database: &DatabaseService,
        views: ViewTracker,
    ) -> Result<Self> {
        let event_service = EventService::new(
            database.events.clone(),
            database.categories.clone(),
            database.users.clone(),
            views,
        );
        let request_service = RequestService::new(
            database.requests.clone(),
            database.events.clone(),
            database.users.clone(),
        );
        let user_service = UserService::new(database.users.clone());
        let category_service =
            CategoryService::new(database.categories.clone(), database.events.clone());
        let compilation_service =
            CompilationService::new(database.compilations.clone(), database.events.clone());
        let stats_client = StatsClient::new(&settings.stats)?;

        Ok(Self {
            event_service,
            request_service,
            user_service,
            category_service,
            compilation_service,
            stats_client,
        })
    }
}
