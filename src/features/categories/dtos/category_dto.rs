use async_graphql::{InputObject, SimpleObject, ID};
use validator::{Validate, ValidationError};

use crate::features::categories::models::Category;
use crate::shared::datetime::LocalDateTime;
use crate::shared::validation::ensure_not_blank;

/// Input for creating or fully replacing a category
#[derive(Debug, Clone, InputObject, Validate)]
#[validate(schema(function = "validate_validity_window"))]
pub struct CategoryInput {
    #[validate(custom(function = "validate_category_name"))]
    pub name: String,

    /// Defaults to the creation time when omitted
    pub valid_from: Option<LocalDateTime>,

    /// Omitted or null leaves the category open-ended
    pub valid_to: Option<LocalDateTime>,
}

fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    ensure_not_blank(name, "Category name cannot be null or empty")
}

fn validate_validity_window(input: &CategoryInput) -> Result<(), ValidationError> {
    match (input.valid_from, input.valid_to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::new("validity_window")
            .with_message("Valid from date cannot be after valid to date".into())),
        _ => Ok(()),
    }
}

/// Response object for category
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Category", complex)]
pub struct CategoryDto {
    pub id: ID,
    pub name: String,
    pub valid_from: LocalDateTime,
    pub valid_to: Option<LocalDateTime>,

    #[graphql(skip)]
    pub row_id: i64,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        Self {
            id: ID::from(c.id.to_string()),
            name: c.name,
            valid_from: c.valid_from.into(),
            valid_to: c.valid_to.map(LocalDateTime::from),
            row_id: c.id,
        }
    }
}
