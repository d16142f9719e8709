//! Compilation repository implementation

use sqlx::PgPool;
use crate::models::compilation::Compilation;
use crate::utils::errors::EventBoardError;

#[derive(Clone)]
pub struct CompilationRepository {
    pool: PgPool,
}

impl CompilationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new compilation
    pub async fn create(&self, title: &str, pinned: bool) -> Result<Compilation, EventBoardError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "INSERT INTO compilations (title, pinned) VALUES ($1, $2) RETURNING id, title, pinned"
        )
        .bind(title)
        .bind(pinned)
        .fetch_one(&self.pool)
        .await?;

        Ok(compilation)
    }

    /// Find compilation by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Compilation>, EventBoardError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "SELECT id, title, pinned FROM compilations WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(compilation)
    }

    /// Update title and pinned flag
    pub async fn update(&self, compilation: &Compilation) -> Result<Compilation, EventBoardError> {
        let updated = sqlx::query_as::<_, Compilation>(
            "UPDATE compilations SET title = $2, pinned = $3 WHERE id = $1 RETURNING id, title, pinned"
        )
        .bind(compilation.id)
        .bind(&compilation.title)
        .bind(compilation.pinned)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete compilation; returns false when no row matched
    pub async fn delete(&self, id: i64) -> Result<bool, EventBoardError> {
        let result = sqlx::query("DELETE FROM compilations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List compilations, optionally filtered by pinned flag, with pagination
    pub async fn list(
        &self,
        pinned: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Compilation>, EventBoardError> {
        let compilations = match pinned {
            Some(pinned) => {
                sqlx::query_as::<_, Compilation>(
                    "SELECT id, title, pinned FROM compilations WHERE pinned = $1 ORDER BY id ASC LIMIT $2 OFFSET $3"
                )
                .bind(pinned)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Compilation>(
                    "SELECT id, title, pinned FROM compilations ORDER BY id ASC LIMIT $1 OFFSET $2"
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(compilations)
    }

    /// Replace the compilation's member events
    pub async fn set_events(
        &self,
        compilation_id: i64,
        event_ids: &[i64],
    ) -> Result<(), EventBoardError> {
        sqlx::query("DELETE FROM compilation_events WHERE compilation_id = $1")
            .bind(compilation_id)
            .execute(&self.pool)
            .await?;

        for event_id in event_ids {
            sqlx::query(
                "INSERT INTO compilation_events (compilation_id, event_id) VALUES ($1, $2)"
            )
            .bind(compilation_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Member event ids of a compilation, in insertion order
    pub async fn event_ids(&self, compilation_id: i64) -> Result<Vec<i64>, EventBoardError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT event_id FROM compilation_events WHERE compilation_id = $1 ORDER BY event_id ASC"
        )
        .bind(compilation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
