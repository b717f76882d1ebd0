use async_trait::async_trait;
use sqlx::PgConnection;

use crate::core::database::{contains_pattern, map_db_error};
use crate::core::error::Result;
use crate::features::products::models::{NewProduct, Product};

/// Persistence port for products
#[async_trait]
pub trait ProductRepository: Send {
    async fn find_all(&mut self) -> Result<Vec<Product>>;

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Product>>;

    async fn find_by_category(&mut self, category_id: i64) -> Result<Vec<Product>>;

    /// Case-insensitive substring match on the name
    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Product>>;

    async fn search_by_category_and_name(
        &mut self,
        category_id: i64,
        pattern: &str,
    ) -> Result<Vec<Product>>;

    async fn insert(&mut self, product: NewProduct) -> Result<Product>;

    async fn update(&mut self, product: &Product) -> Result<Product>;

    /// Returns false when no row had the given id
    async fn delete(&mut self, id: i64) -> Result<bool>;
}

#[async_trait]
impl ProductRepository for PgConnection {
    async fn find_all(&mut self) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, description, category_id FROM product ORDER BY id",
        )
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list products", e))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, description, category_id FROM product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self)
        .await
        .map_err(|e| map_db_error("get product by id", e))
    }

    async fn find_by_category(&mut self, category_id: i64) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category_id
            FROM product
            WHERE category_id = $1
            ORDER BY id
            "#,
        )
        .bind(category_id)
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list products by category", e))
    }

    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category_id
            FROM product
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(contains_pattern(pattern))
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("search products", e))
    }

    async fn search_by_category_and_name(
        &mut self,
        category_id: i64,
        pattern: &str,
    ) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category_id
            FROM product
            WHERE category_id = $1 AND name ILIKE $2 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(category_id)
        .bind(contains_pattern(pattern))
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("search products in category", e))
    }

    async fn insert(&mut self, product: NewProduct) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO product (name, description, category_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, category_id
            "#,
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.category_id)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("create product", e))
    }

    async fn update(&mut self, product: &Product) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE product
            SET name = $1, description = $2, category_id = $3
            WHERE id = $4
            RETURNING id, name, description, category_id
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.id)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("update product", e))
    }

    async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&mut *self)
            .await
            .map_err(|e| map_db_error("delete product", e))?;

        Ok(result.rows_affected() > 0)
    }
}
