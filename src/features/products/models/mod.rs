pub mod product;
pub mod product_image;

pub use product::{NewProduct, Product};
pub use product_image::{NewProductImage, ProductImage};
