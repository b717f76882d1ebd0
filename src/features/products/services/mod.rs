pub mod image_codec;
pub mod product_service;

pub use product_service::ProductService;
