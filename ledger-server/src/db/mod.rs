//! Database module
//!
//! Embedded SurrealDB: RocksDB-backed in production, in-memory for tests.
//! Record access goes through the per-entity repositories.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "ledger";
const DATABASE: &str = "ledger";

/// Open the persistent database under `db_dir/ledger.db`.
pub async fn init_database(db_dir: &Path) -> Result<Surreal<Db>, surrealdb::Error> {
    let db_path = db_dir.join("ledger.db");
    let db = Surreal::new::<RocksDb>(db_path.to_string_lossy().as_ref()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    tracing::info!("Database opened at {}", db_path.display());
    Ok(db)
}

/// Open a throwaway in-memory database. Test harnesses only.
pub async fn init_memory_database() -> Result<Surreal<Db>, surrealdb::Error> {
    let db = Surreal::new::<surrealdb::engine::local::Mem>(()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    Ok(db)
}
