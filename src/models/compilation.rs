//! Curated compilation model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::event::EventDto;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Compilation {
    pub id: i64,
    pub title: String,
    pub pinned: bool,
}

/// Compilation with its member events resolved
#[derive(Debug, Clone, Serialize)]
pub struct CompilationDto {
    pub id: i64,
    pub title: String,
    pub pinned: bool,
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCompilationRequest {
    pub title: String,
    pub pinned: Option<bool>,
    pub events: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompilationRequest {
    pub title: Option<String>,
    pub pinned: Option<bool>,
    pub events: Option<Vec<i64>>,
}
