#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Roster persistence gateway.
//!
//! This crate owns the connection pool to the relational store and is the only
//! place that talks to it. It provides:
//! - typed connection options built from [`DbConnConfig`] (no DSN string building),
//! - a lazily connected pool so the host can start before the store is reachable,
//! - idempotent schema bootstrap from `sea-query` table statements,
//! - parameterized statement execution with typed [`StoreError`] results.
//!
//! # Features
//! - `pg`: PostgreSQL backend (deployments)
//! - `sqlite`: SQLite backend (local `--mock` runs and tests)
//!
//! # Example
//! ```rust,no_run
//! use roster_db::{DbConnConfig, Gateway};
//! use sea_orm::sea_query::{Alias, Query};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = DbConnConfig {
//!     dsn: Some("sqlite::memory:".to_owned()),
//!     ..Default::default()
//! };
//! let gateway = Gateway::connect(&cfg)?;
//!
//! let select = Query::select()
//!     .column(Alias::new("roll"))
//!     .from(Alias::new("students"))
//!     .to_owned();
//! let rows = gateway.query_all(&select).await?;
//! # let _ = rows;
//! gateway.close().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(any(feature = "pg", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod options;
pub mod secret;

#[cfg(any(feature = "pg", feature = "sqlite"))]
mod pool_opts;

pub use config::{DbConnConfig, PoolCfg};
pub use error::StoreError;
pub use gateway::Gateway;
pub use options::{DbConnectOptions, redact_credentials_in_dsn};
pub use secret::SecretString;

use thiserror::Error;

/// Library-local result type for connection setup.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised while building connection options or the pool.
///
/// Statement execution failures are reported as [`StoreError`] instead.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[cfg(any(feature = "pg", feature = "sqlite"))]
    #[error(transparent)]
    Sqlx(#[from] sea_orm::sqlx::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by DSN scheme.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDsn` if the DSN scheme is not recognized.
    pub fn detect(dsn: &str) -> Result<Self> {
        // Trim only leading whitespace to be forgiving with env files.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// The `sea-orm` backend used to render statements for this engine.
    #[must_use]
    pub fn backend(self) -> sea_orm::DbBackend {
        match self {
            Self::Postgres => sea_orm::DbBackend::Postgres,
            Self::Sqlite => sea_orm::DbBackend::Sqlite,
        }
    }
}
