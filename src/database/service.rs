//! Database service layer
//!
//! Bundles the repositories behind a single handle that services borrow from

use crate::database::{
    CategoryRepository, CompilationRepository, DatabasePool, EventRepository, RequestRepository,
    UserRepository,
};

#[derive(Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub events: EventRepository,
    pub requests: RequestRepository,
    pub compilations: CompilationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            requests: RequestRepository::new(pool.clone()),
            compilations: CompilationRepository::new(pool),
        }
    }
}
