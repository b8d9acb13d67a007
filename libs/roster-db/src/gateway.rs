//! The persistence gateway: a pooled connection that renders and runs `sea-query` statements.

use sea_orm::sea_query::{Expr, Query, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, QueryResult, StatementBuilder};

#[cfg(feature = "pg")]
use sea_orm::sqlx::{PgPool, postgres::PgPoolOptions};
#[cfg(feature = "sqlite")]
use sea_orm::sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

#[cfg(any(feature = "pg", feature = "sqlite"))]
use crate::pool_opts::ApplyPoolOpts;
use crate::{DbConnConfig, DbConnectOptions, DbEngine, StoreError};

#[derive(Clone, Debug)]
enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Shared handle to the relational store.
///
/// Cloning is cheap; all clones share one pool. Every statement is rendered with
/// bound parameters, so caller-supplied values never end up in SQL text.
#[derive(Clone, Debug)]
pub struct Gateway {
    engine: DbEngine,
    pool: DbPool,
    conn: DatabaseConnection,
    target: String,
}

impl Gateway {
    /// Build the pool without opening a connection.
    ///
    /// Connections are established on first use, so this succeeds while the
    /// store is still unreachable; [`ensure_schema`](Self::ensure_schema) is the
    /// first call that actually touches it.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be turned into connect options.
    pub fn connect(cfg: &DbConnConfig) -> crate::Result<Self> {
        let opts = DbConnectOptions::from_config(cfg)?;
        let target = opts.to_string();
        let engine = opts.engine();

        tracing::debug!(target_db = %target, engine = ?engine, "Building database pool");

        match opts {
            #[cfg(feature = "pg")]
            DbConnectOptions::Postgres(pg) => {
                let pool = PgPoolOptions::new().apply(&cfg.pool).connect_lazy_with(pg);
                let conn = sea_orm::SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
                Ok(Self {
                    engine,
                    pool: DbPool::Postgres(pool),
                    conn,
                    target,
                })
            }
            #[cfg(feature = "sqlite")]
            DbConnectOptions::Sqlite { opts, in_memory } => {
                let mut pool_opts = SqlitePoolOptions::new().apply(&cfg.pool);
                if in_memory {
                    // Every connection to `:memory:` is a separate database.
                    pool_opts = pool_opts
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                }
                let pool = pool_opts.connect_lazy_with(opts);
                let conn = sea_orm::SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                Ok(Self {
                    engine,
                    pool: DbPool::Sqlite(pool),
                    conn,
                    target,
                })
            }
        }
    }

    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    #[must_use]
    pub fn backend(&self) -> DbBackend {
        self.engine.backend()
    }

    /// Redacted description of the connection target, safe to log.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run the given `CREATE TABLE` statements.
    ///
    /// Statements must be built with `if_not_exists()` so repeated calls are harmless.
    ///
    /// # Errors
    /// Returns the first statement failure.
    pub async fn ensure_schema(&self, tables: &[TableCreateStatement]) -> Result<(), StoreError> {
        for table in tables {
            self.execute(table).await?;
        }
        tracing::debug!(tables = tables.len(), "Schema ensured");
        Ok(())
    }

    /// Run a statement and collect every returned row.
    ///
    /// # Errors
    /// Returns a classified [`StoreError`] on failure.
    pub async fn query_all<S>(&self, stmt: &S) -> Result<Vec<QueryResult>, StoreError>
    where
        S: StatementBuilder + Sync,
    {
        let stmt = self.backend().build(stmt);
        tracing::debug!(sql = %stmt.sql, "query_all");
        Ok(self.conn.query_all(stmt).await?)
    }

    /// Run a statement and return at most one row.
    ///
    /// # Errors
    /// Returns a classified [`StoreError`] on failure.
    pub async fn query_one<S>(&self, stmt: &S) -> Result<Option<QueryResult>, StoreError>
    where
        S: StatementBuilder + Sync,
    {
        let stmt = self.backend().build(stmt);
        tracing::debug!(sql = %stmt.sql, "query_one");
        Ok(self.conn.query_one(stmt).await?)
    }

    /// Run a statement that returns no rows; yields the affected row count.
    ///
    /// # Errors
    /// Returns a classified [`StoreError`] on failure.
    pub async fn execute<S>(&self, stmt: &S) -> Result<u64, StoreError>
    where
        S: StatementBuilder + Sync,
    {
        let stmt = self.backend().build(stmt);
        tracing::debug!(sql = %stmt.sql, "execute");
        let res = self.conn.execute(stmt).await?;
        Ok(res.rows_affected())
    }

    /// Round-trip a trivial query to check that the store answers.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] when no connection can be acquired.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let select = Query::select().expr(Expr::val(1)).to_owned();
        self.query_one(&select).await.map(|_| ())
    }

    /// Close the pool and wait for checked-out connections to be returned.
    pub async fn close(self) {
        tracing::info!(target_db = %self.target, "Closing database pool");
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(pool) => pool.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }
}
