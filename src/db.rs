use std::path::Path;

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::SqliteConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::RunQueryDsl;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{AdspotError, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
type SqlitePool = Pool<SqliteAsyncConn>;
pub type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

#[derive(QueryableByName)]
struct TableNameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Shared handle to the SQLite database. Cloning is cheap; every clone draws from the same pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn open(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let sqlite_path = sqlite_path.as_ref();
        ensure_parent_dir(sqlite_path)?;
        run_migrations(sqlite_path).await?;

        let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new(sqlite_path);
        let pool: SqlitePool = Pool::builder()
            .build(manager)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        self.pool
            .get()
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))
    }

    /// User tables and views, sorted by name. SQLite internals and migration bookkeeping are left out.
    pub async fn table_names(&self) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let rows: Vec<TableNameRow> = diesel::sql_query(
            "SELECT name FROM sqlite_master
             WHERE type IN ('table', 'view')
               AND name NOT LIKE 'sqlite_%'
               AND name != '__diesel_schema_migrations'
             ORDER BY name",
        )
        .load(&mut conn)
        .await
        .map_err(|e| AdspotError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    /// Row count of `table`. Callers must pass a name taken from [`Database::table_names`].
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let mut conn = self.conn().await?;
        let query = format!("SELECT COUNT(*) AS count FROM {}", quote_identifier(table));
        let row: CountRow = diesel::sql_query(query)
            .get_result(&mut conn)
            .await
            .map_err(|e| AdspotError::Database(e.to_string()))?;
        Ok(row.count)
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AdspotError::Runtime(e.to_string()))?;
    }
    Ok(())
}

async fn run_migrations(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)
            .map_err(|e| AdspotError::Database(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AdspotError::Database(e.to_string()))?;
        Ok::<_, AdspotError>(())
    })
    .await
    .map_err(|e| AdspotError::Runtime(e.to_string()))??;
    Ok(())
}
