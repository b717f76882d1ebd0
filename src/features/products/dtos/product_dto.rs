use async_graphql::{InputObject, SimpleObject, ID};
use validator::{Validate, ValidationError};

use crate::core::error::{AppError, Result};
use crate::features::products::models::Product;
use crate::shared::validation::{ensure_not_blank, parse_id};

/// Input for creating or fully replacing a product
#[derive(Debug, Clone, InputObject, Validate)]
pub struct ProductInput {
    #[validate(custom(function = "validate_product_name"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(required(message = "Category ID cannot be null"))]
    pub category_id: Option<ID>,

    /// Base64 payloads, optionally prefixed with a `data:` URI header
    pub images: Option<Vec<String>>,
}

fn validate_product_name(name: &str) -> std::result::Result<(), ValidationError> {
    ensure_not_blank(name, "Product name cannot be null or empty")
}

impl ProductInput {
    /// Numeric category id; call after `validate()`
    pub fn category_row_id(&self) -> Result<i64> {
        let id = self
            .category_id
            .as_ref()
            .ok_or_else(|| AppError::invalid_field("categoryId", "Category ID cannot be null"))?;
        parse_id("categoryId", id)
    }
}

/// Response object for product
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Product", complex)]
pub struct ProductDto {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub category_id: ID,

    #[graphql(skip)]
    pub row_id: i64,
    #[graphql(skip)]
    pub category_row_id: i64,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: ID::from(p.id.to_string()),
            name: p.name,
            description: p.description,
            category_id: ID::from(p.category_id.to_string()),
            row_id: p.id,
            category_row_id: p.category_id,
        }
    }
}
