//! Products and their image attachments.
//!
//! Images arrive as base64 strings (optionally `data:` URIs), are stored as
//! raw bytes, and are returned base64-encoded in `imageOrder` order.

pub mod dtos;
pub mod models;
pub mod repositories;
pub mod resolvers;
pub mod services;

pub use resolvers::{ProductMutation, ProductQuery};
pub use services::ProductService;
