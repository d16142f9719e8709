//! Category administration service

use tracing::{debug, info};

use crate::database::repositories::{CategoryRepository, EventRepository};
use crate::models::category::{Category, NewCategoryRequest};
use crate::utils::errors::{EventBoardError, Result};

/// Category service for moderated category management
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
    events: EventRepository,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(categories: CategoryRepository, events: EventRepository) -> Self {
        Self { categories, events }
    }

    /// Create a category; names must be unique
    pub async fn create_category(&self, request: NewCategoryRequest) -> Result<Category> {
        debug!(name = %request.name, "Creating category");

        if self.categories.find_by_name(&request.name).await?.is_some() {
            return Err(EventBoardError::Conflict(
                "A category with this name already exists".to_string(),
            ));
        }

        let category = self.categories.create(&request.name).await?;
        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    /// Rename a category; the new name must not collide with another one
    pub async fn update_category(
        &self,
        category_id: i64,
        request: NewCategoryRequest,
    ) -> Result<Category> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or(EventBoardError::CategoryNotFound { category_id })?;

        if let Some(existing) = self.categories.find_by_name(&request.name).await? {
            if existing.id != category_id {
                return Err(EventBoardError::Conflict(
                    "A category with this name already exists".to_string(),
                ));
            }
        }

        self.categories.update(category_id, &request.name).await
    }

    /// Delete a category that no event references
    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or(EventBoardError::CategoryNotFound { category_id })?;

        if self.events.exists_by_category(category_id).await? {
            return Err(EventBoardError::Conflict(
                "The category is referenced by existing events".to_string(),
            ));
        }

        self.categories.delete(category_id).await?;
        info!(category_id = category_id, "Category deleted");
        Ok(())
    }

    /// Category by id
    pub async fn get_category(&self, category_id: i64) -> Result<Category> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or(EventBoardError::CategoryNotFound { category_id })
    }

    /// Paginated category listing
    pub async fn get_categories(
        &self,
        from: Option<i64>,
        size: Option<i64>,
    ) -> Result<Vec<Category>> {
        self.categories
            .list(size.unwrap_or(10), from.unwrap_or(0))
            .await
    }
}
