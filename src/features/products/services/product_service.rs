use std::sync::Arc;

use validator::Validate;

use crate::core::database::{Database, UnitOfWork};
use crate::core::error::{AppError, Result};
use crate::features::products::dtos::ProductInput;
use crate::features::products::models::{NewProduct, NewProductImage, Product, ProductImage};
use crate::features::products::services::image_codec::decode_image;

/// Decode and store `images` in list order, stopping at the first bad entry.
///
/// Orders continue from `first_order`. Entries stored before a failing one
/// are left in the unit of work.
async fn save_product_images(
    uow: &mut dyn UnitOfWork,
    product_id: i64,
    first_order: i32,
    images: &[String],
) -> Result<()> {
    for (index, encoded) in images.iter().enumerate() {
        let image = decode_image(index, encoded)?;
        let image_order = i32::try_from(index)
            .ok()
            .and_then(|offset| first_order.checked_add(offset))
            .ok_or_else(|| AppError::validation("Too many images for one product"))?;

        uow.images()
            .insert(NewProductImage {
                image,
                product_id,
                image_order,
            })
            .await?;
    }
    Ok(())
}

/// Finish a write that stored images.
///
/// A decode failure still commits the product and the images decoded before
/// it; any other failure drops the unit of work and rolls everything back.
async fn commit_with_images(uow: Box<dyn UnitOfWork>, outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => uow.commit().await,
        Err(err @ AppError::Validation { .. }) => {
            uow.commit().await?;
            Err(err)
        }
        Err(err) => Err(err),
    }
}

fn category_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Category not found with id: {}", id))
}

/// Service for product operations
pub struct ProductService {
    db: Arc<dyn Database>,
}

impl ProductService {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        input.validate()?;
        let category_id = input.category_row_id()?;

        let mut uow = self.db.begin().await?;
        if !uow.categories().exists_by_id(category_id).await? {
            return Err(category_not_found(category_id));
        }

        let product = uow
            .products()
            .insert(NewProduct {
                name: input.name,
                description: input.description,
                category_id,
            })
            .await?;

        let images = input.images.unwrap_or_default();
        let outcome = save_product_images(uow.as_mut(), product.id, 0, &images).await;
        commit_with_images(uow, outcome).await?;

        tracing::info!(
            product_id = product.id,
            images = images.len(),
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_all_products(&self) -> Result<Vec<Product>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.products().find_all().await
    }

    pub async fn get_product_by_id(&self, id: i64) -> Result<Option<Product>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.products().find_by_id(id).await
    }

    pub async fn get_products_by_category(&self, category_id: i64) -> Result<Vec<Product>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.products().find_by_category(category_id).await
    }

    pub async fn search_products_by_name(&self, name: &str) -> Result<Vec<Product>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.products().search_by_name(name).await
    }

    pub async fn search_products_by_category_and_name(
        &self,
        category_id: i64,
        name: &str,
    ) -> Result<Vec<Product>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.products()
            .search_by_category_and_name(category_id, name)
            .await
    }

    /// Stored images in display order
    pub async fn get_product_images(&self, product_id: i64) -> Result<Vec<ProductImage>> {
        let mut uow = self.db.begin_read_only().await?;
        uow.images().find_by_product(product_id).await
    }

    /// Replace name, description and category; supplied images are appended
    /// to the ones already stored.
    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<Product> {
        input.validate()?;
        let category_id = input.category_row_id()?;

        let mut uow = self.db.begin().await?;
        let mut product = uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product not found with id: {}", id)))?;

        if !uow.categories().exists_by_id(category_id).await? {
            return Err(category_not_found(category_id));
        }

        product.name = input.name;
        product.description = input.description;
        product.category_id = category_id;
        let product = uow.products().update(&product).await?;

        let outcome = match input.images.as_deref() {
            Some(images) if !images.is_empty() => {
                let first_order = uow.images().next_image_order(id).await?;
                save_product_images(uow.as_mut(), id, first_order, images).await
            }
            _ => Ok(()),
        };
        commit_with_images(uow, outcome).await?;

        tracing::info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// Returns false when the product did not exist
    pub async fn delete_product(&self, id: i64) -> Result<bool> {
        let mut uow = self.db.begin().await?;
        let deleted = uow.products().delete(id).await?;
        uow.commit().await?;

        if deleted {
            tracing::info!(product_id = id, "Product deleted");
        }
        Ok(deleted)
    }
}
