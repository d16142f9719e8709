//! Error handling for EventBoard
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the EventBoard application
#[derive(Error, Debug)]
pub enum EventBoardError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: i64 },

    #[error("Request not found: {request_id}")]
    RequestNotFound { request_id: i64 },

    #[error("Compilation not found: {compilation_id}")]
    CompilationNotFound { compilation_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for EventBoard operations
pub type Result<T> = std::result::Result<T, EventBoardError>;

impl EventBoardError {
    /// Check whether the error maps to a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EventBoardError::UserNotFound { .. }
                | EventBoardError::EventNotFound { .. }
                | EventBoardError::CategoryNotFound { .. }
                | EventBoardError::RequestNotFound { .. }
                | EventBoardError::CompilationNotFound { .. }
        )
    }

    /// Check whether the error is a business-rule conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, EventBoardError::Conflict(_))
    }

    /// Check whether the error is caused by malformed input
    pub fn is_validation(&self) -> bool {
        matches!(self, EventBoardError::Validation(_))
    }

    /// Short reason string reported alongside the error message
    pub fn reason(&self) -> &'static str {
        if self.is_not_found() {
            "The required object was not found."
        } else if self.is_conflict() {
            "Integrity constraint has been violated."
        } else if self.is_validation() {
            "Incorrectly made request."
        } else {
            "Internal server error."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(EventBoardError::EventNotFound { event_id: 7 }.is_not_found());
        assert!(EventBoardError::Conflict("limit reached".to_string()).is_conflict());
        assert!(EventBoardError::Validation("bad date".to_string()).is_validation());
        assert!(!EventBoardError::Conflict("x".to_string()).is_not_found());
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(
            EventBoardError::UserNotFound { user_id: 1 }.reason(),
            "The required object was not found."
        );
        assert_eq!(
            EventBoardError::Conflict("dup".to_string()).reason(),
            "Integrity constraint has been violated."
        );
        assert_eq!(
            EventBoardError::Validation("neg".to_string()).reason(),
            "Incorrectly made request."
        );
        assert_eq!(
            EventBoardError::Config("broken".to_string()).reason(),
            "Internal server error."
        );
    }
}
