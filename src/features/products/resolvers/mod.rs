pub mod product_resolver;

pub use product_resolver::{ProductMutation, ProductQuery};
