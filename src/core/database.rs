use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use crate::core::config::DatabaseConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::products::repositories::{ProductImageRepository, ProductRepository};

pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// A transaction scope exposing the repositories bound to it.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] discards
/// every write made through it.
#[async_trait]
pub trait UnitOfWork: Send {
    fn categories(&mut self) -> &mut dyn CategoryRepository;
    fn products(&mut self) -> &mut dyn ProductRepository;
    fn images(&mut self) -> &mut dyn ProductImageRepository;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Entry point to the store: hands out one unit of work per operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Read-write scope
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;

    /// Scope for queries; the store rejects writes made through it
    async fn begin_read_only(&self) -> Result<Box<dyn UnitOfWork>>;
}

#[derive(Clone, Debug)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn start(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to start transaction: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.start().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn begin_read_only(&self) -> Result<Box<dyn UnitOfWork>> {
        let mut tx = self.start().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error("mark transaction read-only", e))?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Unit of work over a live PostgreSQL transaction; the repositories are
/// implemented directly on the transaction's connection.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn categories(&mut self) -> &mut dyn CategoryRepository {
        &mut *self.tx
    }

    fn products(&mut self) -> &mut dyn ProductRepository {
        &mut *self.tx
    }

    fn images(&mut self) -> &mut dyn ProductImageRepository {
        &mut *self.tx
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_db_error("commit transaction", e))
    }
}

/// Convert a database error to an AppError, logging the failed action
pub fn map_db_error(action: &str, e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Unique constraint violation
        if db_err.code() == Some(Cow::Borrowed("23505")) {
            if db_err.constraint() == Some("category_name_unique") {
                return AppError::Conflict("Category with this name already exists".to_string());
            }
            return AppError::Conflict("Record already exists".to_string());
        }

        // Foreign key violation
        if db_err.code() == Some(Cow::Borrowed("23503")) {
            return AppError::NotFound("Referenced record does not exist".to_string());
        }

        // Check constraint violation
        if db_err.code() == Some(Cow::Borrowed("23514")) {
            return AppError::validation("Valid from date cannot be after valid to date");
        }
    }

    tracing::error!("Failed to {}: {:?}", action, e);
    AppError::Database(e)
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters of `input`
pub fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
