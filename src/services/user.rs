//! User administration service

use tracing::{debug, info};

use crate::database::repositories::UserRepository;
use crate::models::user::{NewUserRequest, User};
use crate::utils::errors::{EventBoardError, Result};

/// User service for admin-side user management
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user; email addresses must be unique
    pub async fn create_user(&self, request: NewUserRequest) -> Result<User> {
        debug!(email = %request.email, "Creating user");

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(EventBoardError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let user = self.users.create(request).await?;
        info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// List users, optionally restricted to ids, with pagination
    pub async fn get_users(
        &self,
        ids: Option<Vec<i64>>,
        from: Option<i64>,
        size: Option<i64>,
    ) -> Result<Vec<User>> {
        let limit = size.unwrap_or(10);
        let offset = from.unwrap_or(0);
        self.users.list(ids.as_deref(), limit, offset).await
    }

    /// Delete a user
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        if !self.users.delete(user_id).await? {
            return Err(EventBoardError::UserNotFound { user_id });
        }
        info!(user_id = user_id, "User deleted");
        Ok(())
    }
}
