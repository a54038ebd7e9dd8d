use crate::db::schema::{SQLITE_INIT, SQLITE_SEED, statements};
use crate::error::PresenterError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Handle over the shared pool. Entity queries live in the sibling
/// `users`, `series`, `sensors` and `measurements` modules.
#[derive(Clone)]
pub struct PresenterStorage {
    pub(super) pool: SqlitePool,
}

impl PresenterStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, PresenterError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // every pooled connection to `:memory:` would be its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), PresenterError> {
        // sqlx::query runs a single statement at a time
        for stmt in statements(SQLITE_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert the demo data set when no users exist yet. Returns whether anything was written.
    pub async fn seed_demo_data(&self) -> Result<bool, PresenterError> {
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if users > 0 {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;
        for stmt in statements(SQLITE_SEED) {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("seeded demo users, series, sensors and measurements");
        Ok(true)
    }
}
