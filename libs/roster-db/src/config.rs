//! Database connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

use crate::options::redact_credentials_in_dsn;
use crate::secret::SecretString;

/// Connection settings for the relational store.
///
/// When `dsn` is set it wins over the typed `host`/`port`/`dbname`/`user`/`password`
/// fields; otherwise a PostgreSQL connection is built from the typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConnConfig {
    #[serde(serialize_with = "serialize_dsn_redacted")]
    pub dsn: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: SecretString,
    pub pool: PoolCfg,
    /// Delay between schema initialization attempts while the store is unreachable.
    #[serde(with = "humantime_serde")]
    pub schema_retry_interval: Duration,
}

impl Default for DbConnConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            host: "postgres-service".to_owned(),
            port: 5432,
            dbname: "studentdb".to_owned(),
            user: "postgres".to_owned(),
            password: SecretString::new("postgres"),
            pool: PoolCfg::default(),
            schema_retry_interval: Duration::from_secs(2),
        }
    }
}

impl DbConnConfig {
    /// In-memory SQLite configuration used by `--mock` runs and tests.
    #[must_use]
    pub fn sqlite_memory() -> Self {
        Self {
            dsn: Some("sqlite::memory:".to_owned()),
            ..Self::default()
        }
    }
}

/// Pool knobs; each driver applies the subset it supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolCfg {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of idle connections kept open.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    #[serde(with = "humantime_serde::option")]
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    #[serde(with = "humantime_serde::option")]
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    #[serde(with = "humantime_serde::option")]
    pub max_lifetime: Option<Duration>,
    /// Test connection health before acquire.
    pub test_before_acquire: bool,
}

impl Default for PoolCfg {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_dsn_redacted<S: Serializer>(dsn: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match dsn {
        Some(dsn) => s.serialize_some(&redact_credentials_in_dsn(Some(dsn))),
        None => s.serialize_none(),
    }
}
