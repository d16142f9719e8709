//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{NewUserRequest, User};
use crate::utils::errors::EventBoardError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: NewUserRequest) -> Result<User, EventBoardError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at
            "#
        )
        .bind(request.name)
        .bind(request.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventBoardError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, EventBoardError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE email = $1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List users, optionally restricted to a set of ids, with pagination
    pub async fn list(
        &self,
        ids: Option<&[i64]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, EventBoardError> {
        let users = match ids {
            Some(ids) if !ids.is_empty() => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email, created_at FROM users WHERE id = ANY($1) ORDER BY id ASC"
                )
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, email, created_at FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Delete user; returns false when no row matched
    pub async fn delete(&self, id: i64) -> Result<bool, EventBoardError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
