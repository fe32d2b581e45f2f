//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection reader pool for concurrent reads with a single-connection
//! writer pool for serialized writes. Both use WAL journal mode and enforce
//! foreign keys.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Connections in the read pool.
const READER_CONNECTIONS: u32 = 8;

/// Split read/write pool for SQLite with WAL mode.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools and run pending migrations on the writer.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(base_opts)
            .await?;

        // The reader opens read-only, so the schema must exist first
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(read_opts)
            .await?;

        tracing::debug!(database_url, "Database pool opened");
        Ok(Self { reader, writer })
    }

    /// Close both pools, checkpointing the WAL on the writer's last connection.
    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}
