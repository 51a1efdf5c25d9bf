//! Repository module
//!
//! Per-entity data access over the embedded SurrealDB. Repositories are
//! cheap to construct (they clone the connection handle) and are built
//! per call site from `state.db`.

pub mod notification;
pub mod product;
pub mod restock;
pub mod sale;
pub mod user;

pub use notification::NotificationRepository;
pub use product::ProductRepository;
pub use restock::RestockRepository;
pub use sale::SaleRepository;
pub use user::UserRepository;

use shared::AppError;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID convention: "table:key" end to end
// =============================================================================
//
// All record ids travel as surrealdb::RecordId; API path parameters accept
// either the bare key or the full "table:key" form.

/// Build a RecordId from a possibly table-prefixed id string.
pub fn record_id(table: &str, id: &str) -> RecordId {
    let key = id.strip_prefix(&format!("{table}:")).unwrap_or(id);
    RecordId::from_table_key(table, key)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Row shape of `SELECT count() ... GROUP ALL`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: u64,
}
