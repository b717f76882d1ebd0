use async_trait::async_trait;
use sqlx::PgConnection;

use crate::core::database::map_db_error;
use crate::core::error::Result;
use crate::features::products::models::{NewProductImage, ProductImage};

/// Persistence port for product images
#[async_trait]
pub trait ProductImageRepository: Send {
    /// Images of a product by ascending `image_order`, ties by insertion
    async fn find_by_product(&mut self, product_id: i64) -> Result<Vec<ProductImage>>;

    /// Order value that places a new image after every stored one
    async fn next_image_order(&mut self, product_id: i64) -> Result<i32>;

    async fn insert(&mut self, image: NewProductImage) -> Result<ProductImage>;
}

#[async_trait]
impl ProductImageRepository for PgConnection {
    async fn find_by_product(&mut self, product_id: i64) -> Result<Vec<ProductImage>> {
        sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, image, product_id, image_order
            FROM product_image
            WHERE product_id = $1
            ORDER BY image_order ASC, id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *self)
        .await
        .map_err(|e| map_db_error("list product images", e))
    }

    async fn next_image_order(&mut self, product_id: i64) -> Result<i32> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(image_order) + 1, 0) FROM product_image WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("compute next image order", e))
    }

    async fn insert(&mut self, image: NewProductImage) -> Result<ProductImage> {
        sqlx::query_as::<_, ProductImage>(
            r#"
            INSERT INTO product_image (image, product_id, image_order)
            VALUES ($1, $2, $3)
            RETURNING id, image, product_id, image_order
            "#,
        )
        .bind(image.image)
        .bind(image.product_id)
        .bind(image.image_order)
        .fetch_one(&mut *self)
        .await
        .map_err(|e| map_db_error("save product image", e))
    }
}
