//! In-memory store used by service and resolver tests.
//!
//! Each unit of work operates on a private copy of the state and publishes it
//! on commit, so a dropped unit of work behaves like a rolled-back
//! transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::core::database::{Database, UnitOfWork};
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::products::models::{NewProduct, NewProductImage, Product, ProductImage};
use crate::features::products::repositories::{ProductImageRepository, ProductRepository};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub categories: BTreeMap<i64, Category>,
    pub products: BTreeMap<i64, Product>,
    pub images: BTreeMap<i64, ProductImage>,
    last_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn categories_where(&self, keep: impl Fn(&Category) -> bool) -> Vec<Category> {
        self.categories.values().filter(|c| keep(c)).cloned().collect()
    }

    fn products_where(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.products.values().filter(|p| keep(p)).cloned().collect()
    }

    fn delete_product_cascade(&mut self, id: i64) -> bool {
        let existed = self.products.remove(&id).is_some();
        self.images.retain(|_, image| image.product_id != id);
        existed
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Committed state
    pub fn snapshot(&self) -> MemoryState {
        self.lock().clone()
    }

    /// Insert a category directly, bypassing service validation
    pub fn seed_category(&self, category: NewCategory) -> Category {
        let mut state = self.lock();
        let id = state.next_id();
        let category = Category {
            id,
            name: category.name,
            valid_from: category.valid_from,
            valid_to: category.valid_to,
        };
        state.categories.insert(id, category.clone());
        category
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            working: self.snapshot(),
            read_only: false,
        }))
    }

    async fn begin_read_only(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            working: self.snapshot(),
            read_only: true,
        }))
    }
}

struct InMemoryUnitOfWork {
    shared: Arc<Mutex<MemoryState>>,
    working: MemoryState,
    read_only: bool,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn categories(&mut self) -> &mut dyn CategoryRepository {
        &mut self.working
    }

    fn products(&mut self) -> &mut dyn ProductRepository {
        &mut self.working
    }

    fn images(&mut self) -> &mut dyn ProductImageRepository {
        &mut self.working
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork {
            shared,
            working,
            read_only,
        } = *self;
        if read_only {
            return Ok(());
        }
        let mut state = shared
            .lock()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))?;
        *state = working;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryState {
    async fn find_all(&mut self) -> Result<Vec<Category>> {
        Ok(self.categories_where(|_| true))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).cloned())
    }

    async fn find_active(&mut self, now: NaiveDateTime) -> Result<Vec<Category>> {
        Ok(self.categories_where(|c| c.is_active_at(now)))
    }

    async fn find_valid_at(&mut self, at: NaiveDateTime) -> Result<Vec<Category>> {
        Ok(self.categories_where(|c| c.is_valid_at(at)))
    }

    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Category>> {
        Ok(self.categories_where(|c| contains_ignore_case(&c.name, pattern)))
    }

    async fn exists_by_id(&mut self, id: i64) -> Result<bool> {
        Ok(self.categories.contains_key(&id))
    }

    async fn exists_by_name(&mut self, name: &str) -> Result<bool> {
        Ok(self.categories.values().any(|c| c.name == name))
    }

    async fn exists_by_name_excluding(&mut self, name: &str, id: i64) -> Result<bool> {
        Ok(self
            .categories
            .values()
            .any(|c| c.name == name && c.id != id))
    }

    async fn insert(&mut self, category: NewCategory) -> Result<Category> {
        let id = self.next_id();
        let category = Category {
            id,
            name: category.name,
            valid_from: category.valid_from,
            valid_to: category.valid_to,
        };
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&mut self, category: &Category) -> Result<Category> {
        match self.categories.get_mut(&category.id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(category.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.id
            ))),
        }
    }

    async fn delete(&mut self, id: i64) -> Result<bool> {
        if self.categories.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = self
            .products
            .values()
            .filter(|p| p.category_id == id)
            .map(|p| p.id)
            .collect();
        for product_id in owned {
            self.delete_product_cascade(product_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ProductRepository for MemoryState {
    async fn find_all(&mut self) -> Result<Vec<Product>> {
        Ok(self.products_where(|_| true))
    }

    async fn find_by_id(&mut self, id: i64) -> Result<Option<Product>> {
        Ok(self.products.get(&id).cloned())
    }

    async fn find_by_category(&mut self, category_id: i64) -> Result<Vec<Product>> {
        Ok(self.products_where(|p| p.category_id == category_id))
    }

    async fn search_by_name(&mut self, pattern: &str) -> Result<Vec<Product>> {
        Ok(self.products_where(|p| contains_ignore_case(&p.name, pattern)))
    }

    async fn search_by_category_and_name(
        &mut self,
        category_id: i64,
        pattern: &str,
    ) -> Result<Vec<Product>> {
        Ok(self.products_where(|p| {
            p.category_id == category_id && contains_ignore_case(&p.name, pattern)
        }))
    }

    async fn insert(&mut self, product: NewProduct) -> Result<Product> {
        if !self.categories.contains_key(&product.category_id) {
            return Err(AppError::NotFound(
                "Referenced record does not exist".to_string(),
            ));
        }
        let id = self.next_id();
        let product = Product {
            id,
            name: product.name,
            description: product.description,
            category_id: product.category_id,
        };
        self.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&mut self, product: &Product) -> Result<Product> {
        match self.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(product.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Product not found with id: {}",
                product.id
            ))),
        }
    }

    async fn delete(&mut self, id: i64) -> Result<bool> {
        Ok(self.delete_product_cascade(id))
    }
}

#[async_trait]
impl ProductImageRepository for MemoryState {
    async fn find_by_product(&mut self, product_id: i64) -> Result<Vec<ProductImage>> {
        let mut images: Vec<ProductImage> = self
            .images
            .values()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| (i.image_order, i.id));
        Ok(images)
    }

    async fn next_image_order(&mut self, product_id: i64) -> Result<i32> {
        Ok(self
            .images
            .values()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.image_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn insert(&mut self, image: NewProductImage) -> Result<ProductImage> {
        let id = self.next_id();
        let image = ProductImage {
            id,
            image: image.image,
            product_id: image.product_id,
            image_order: image.image_order,
        };
        self.images.insert(id, image.clone());
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::datetime::now;

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let db = InMemoryDatabase::new();
        {
            let mut uow = db.begin().await.unwrap();
            uow.categories()
                .insert(NewCategory {
                    name: "Draft".to_string(),
                    valid_from: now(),
                    valid_to: None,
                })
                .await
                .unwrap();
        }
        assert!(db.snapshot().categories.is_empty());

        let mut uow = db.begin().await.unwrap();
        uow.categories()
            .insert(NewCategory {
                name: "Kept".to_string(),
                valid_from: now(),
                valid_to: None,
            })
            .await
            .unwrap();
        uow.commit().await.unwrap();
        assert_eq!(db.snapshot().categories.len(), 1);
    }

    #[tokio::test]
    async fn test_category_delete_cascades() {
        let db = InMemoryDatabase::new();
        let category = db.seed_category(NewCategory {
            name: "Footwear".to_string(),
            valid_from: now(),
            valid_to: None,
        });

        let mut uow = db.begin().await.unwrap();
        let product = uow
            .products()
            .insert(NewProduct {
                name: "Boot".to_string(),
                description: None,
                category_id: category.id,
            })
            .await
            .unwrap();
        uow.images()
            .insert(NewProductImage {
                image: vec![1, 2, 3],
                product_id: product.id,
                image_order: 0,
            })
            .await
            .unwrap();
        assert!(uow.categories().delete(category.id).await.unwrap());
        uow.commit().await.unwrap();

        let state = db.snapshot();
        assert!(state.products.is_empty());
        assert!(state.images.is_empty());
    }
}
