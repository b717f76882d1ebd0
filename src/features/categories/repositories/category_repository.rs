use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgConnection;

use crate::core::database::{contains_pattern, map_db_error};
use crate::core::error::Result;
use crate::features::categories::models::{Category, NewCategory};

/// Persistence port for categories
#[async_trait]
pub trait CategoryRepository: Send {
    async fn find_all(&mut self) -> Result<Vec<Category>>;

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>>;

    /// Categories whose `valid_to` is unset or strictly after `now`
    async fn find_active(&mut self, now: NaiveDateTime) -> Result<Vec<Category>>;

    /// Categories whose validity window contains `at`
    async fn find_valid_at(&mut self, at: NaiveDateTime) -> Result<Vec<Category>>;

    /// Case-insensitive substring match on the name
    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Category>>;

    async fn exists_by_id(&mut self, id: i64) -> Result<bool>;

    async fn exists_by_name(&mut self, name: &str) -> Result<bool>;

    /// Whether a category other than `id` already uses `name`
    async fn exists_by_name_excluding(&mut self, name: &str, id: i64) -> Result<bool>;

    async fn insert(&mut self, category: NewCategory) -> Result<Category>;

    async fn update(&mut self, category: &Category) -> Result<Category>;

    /// Returns false when no row had the given id
    async fn delete(&mut self, id: i64) -> Result<bool>;
}

#[async_trait]
impl CategoryRepository for PgConnection {
    async fn find_all(&mut self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, valid_from, valid_to FROM category ORDER BY id",
        )
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list categories", e))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, valid_from, valid_to FROM category WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self)
        .await
        .map_err(|e| map_db_error("get category by id", e))
    }

    async fn find_active(&mut self, now: NaiveDateTime) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, valid_from, valid_to
            FROM category
            WHERE valid_to IS NULL OR valid_to > $1
            ORDER BY id
            "#,
        )
        .bind(now)
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list active categories", e))
    }

    async fn find_valid_at(&mut self, at: NaiveDateTime) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, valid_from, valid_to
            FROM category
            WHERE valid_from <= $1 AND (valid_to IS NULL OR valid_to > $1)
            ORDER BY id
            "#,
        )
        .bind(at)
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list categories valid at time", e))
    }

    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, valid_from, valid_to
            FROM category
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(pattern))
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("search categories", e))
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self)
            .await
            .map_err(|e| map_db_error("check category existence", e))
    }

    async fn exists_by_name(&mut self, name: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM category WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut *self)
            .await
            .map_err(|e| map_db_error("check category name", e))
    }

    async fn exists_by_name_excluding(&mut self, name: &str, id: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM category WHERE name = $1 AND id <> $2)",
        )
        .bind(name)
        .bind(id)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("check category name", e))
    }

    async fn insert(&mut self, category: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO category (name, valid_from, valid_to)
            VALUES ($1, $2, $3)
            RETURNING id, name, valid_from, valid_to
            "#,
        )
        .bind(category.name)
        .bind(category.valid_from)
        .bind(category.valid_to)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("create category", e))
    }

    async fn update(&mut self, category: &Category) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE category
            SET name = $1, valid_from = $2, valid_to = $3
            WHERE id = $4
            RETURNING id, name, valid_from, valid_to
            "#,
        )
        .bind(&category.name)
        .bind(category.valid_from)
        .bind(category.valid_to)
        .bind(category.id)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("update category", e))
    }

    async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await
            .map_err(|e| map_db_error("delete category", e))?;

        Ok(result.rows_affected() > 0)
    }
}
