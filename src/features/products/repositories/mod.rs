pub mod product_image_repository;
pub mod product_repository;

pub use product_image_repository::ProductImageRepository;
pub use product_repository::ProductRepository;
