//! Categories with a validity window.
//!
//! ## Operations
//!
//! | Kind | Field | Description |
//! |------|-------|-------------|
//! | Query | `categories` | All categories |
//! | Query | `category(id)` | One category or null |
//! | Query | `activeCategories` | `validTo` unset or in the future |
//! | Query | `categoriesValidAt(dateTime)` | Window contains the instant |
//! | Query | `searchCategories(name)` | Case-insensitive name match |
//! | Mutation | `createCategory(input)` | Create |
//! | Mutation | `updateCategory(id, input)` | Full replace |
//! | Mutation | `deleteCategory(id)` | Delete, cascading to products |

pub mod dtos;
pub mod models;
pub mod repositories;
pub mod resolvers;
pub mod services;

pub use resolvers::{CategoryMutation, CategoryQuery};
pub use services::CategoryService;
