//! Database module: models, schema and queries for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and the timestamp codec
//! - `schema.rs`: SQL DDL and demo seed data (SQLite-first)
//! - `sqlite.rs`: pool handle, schema init and seeding
//! - `users.rs`, `series.rs`, `sensors.rs`, `measurements.rs`: per-table queries

pub mod measurements;
pub mod models;
pub mod schema;
pub mod sensors;
pub mod series;
pub mod sqlite;
pub mod users;

pub use schema::{SQLITE_INIT, SQLITE_SEED};
pub use sqlite::{PresenterStorage, SqlitePool};

use crate::error::PresenterError;

/// Connect, create tables, and optionally seed the demo data.
pub async fn open(database_url: &str, seed: bool) -> Result<PresenterStorage, PresenterError> {
    let storage = PresenterStorage::connect(database_url).await?;
    storage.init_schema().await?;
    if seed {
        storage.seed_demo_data().await?;
    }
    Ok(storage)
}
