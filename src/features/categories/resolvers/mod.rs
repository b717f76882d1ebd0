pub mod category_resolver;

pub use category_resolver::{CategoryMutation, CategoryQuery};
