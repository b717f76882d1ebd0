pub mod config;
pub mod database;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod router;
