use std::borrow::Cow;

use async_graphql::ID;
use validator::ValidationError;

use crate::core::error::{AppError, Result};

/// Reject values that are empty once surrounding whitespace is removed
pub fn ensure_not_blank(value: &str, message: &'static str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

/// Parse a GraphQL `ID` into a numeric row id
pub fn parse_id(field: &str, id: &ID) -> Result<i64> {
    id.trim()
        .parse::<i64>()
        .map_err(|_| AppError::invalid_field(field, format!("Invalid id '{}'", id.as_str())))
}
