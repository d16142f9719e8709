//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub email: String,
}

/// Short user representation embedded in event payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserShortDto {
    pub id: i64,
    pub name: String,
}
