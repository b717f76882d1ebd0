use std::sync::Arc;

use chrono::NaiveDateTime;
use validator::Validate;

use crate::core::database::Database;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryInput;
use crate::features::categories::models::{Category, NewCategory};
use crate::shared::datetime;

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("Category with name '{}' already exists", name))
}

/// Service for category operations
pub struct CategoryService {
    db: Arc<dyn Database>,
}

impl CategoryService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Create a category; `valid_from` defaults to now
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        input.validate()?;

        let mut uow = self.db.begin().await?;
        if uow.categories().exists_by_name(&input.name).await? {
            return Err(duplicate_name(&input.name));
        }

        let category = uow
            .categories()
            .insert(NewCategory {
                name: input.name,
                valid_from: input.valid_from.map_or_else(datetime::now, |t| t.0),
                valid_to: input.valid_to.map(|t| t.0),
            })
            .await?;
        uow.commit().await?;

        tracing::info!(category_id = category.id, "Category created");
        Ok(category)
    }

    pub async fn get_all_categories(&self) -> Result<Vec<Category>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.categories().find_all().await
    }

    pub async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.categories().find_by_id(id).await
    }

    /// Categories that have not expired at call time
    pub async fn get_active_categories(&self) -> Result<Vec<Category>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.categories().find_active(datetime::now()).await
    }

    pub async fn get_categories_valid_at(&self, at: NaiveDateTime) -> Result<Vec<Category>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.categories().find_valid_at(at).await
    }

    pub async fn search_categories_by_name(&self, name: &str) -> Result<Vec<Category>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.categories().search_by_name(name).await
    }

    /// Replace every field of a category.
    ///
    /// An omitted `valid_from` keeps the stored value; `valid_to` is always
    /// overwritten, so passing none reopens the category.
    pub async fn update_category(&self, id: i64, input: CategoryInput) -> Result<Category> {
        input.validate()?;

        let mut uow = self.db.begin().await?;
        let mut category = uow
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))?;

        if category.name != input.name
            && uow
                .categories()
                .exists_by_name_excluding(&input.name, id)
                .await?
        {
            return Err(duplicate_name(&input.name));
        }

        if let Some(valid_from) = input.valid_from {
            category.valid_from = valid_from.0;
        }
        category.valid_to = input.valid_to.map(|t| t.0);
        category.name = input.name;

        // The kept valid_from may now lie after the new valid_to
        if category.valid_to.is_some_and(|to| category.valid_from > to) {
            return Err(AppError::validation(
                "Valid from date cannot be after valid to date",
            ));
        }

        let category = uow.categories().update(&category).await?;
        uow.commit().await?;

        tracing::info!(category_id = category.id, "Category updated");
        Ok(category)
    }

    /// Returns false when the category did not exist
    pub async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut uow = self.db.begin().await?;
        let deleted = uow.categories().delete(id).await?;
        uow.commit().await?;

        if deleted {
            tracing::info!(category_id = id, "Category deleted");
        }
        Ok(deleted)
    }
}
