//! Typed connection options built from [`DbConnConfig`].

use std::fmt;
#[cfg(any(feature = "pg", feature = "sqlite"))]
use std::str::FromStr;

use crate::config::DbConnConfig;
use crate::{DbEngine, DbError, Result};

#[cfg(feature = "pg")]
use sea_orm::sqlx::postgres::PgConnectOptions;
#[cfg(feature = "sqlite")]
use sea_orm::sqlx::sqlite::SqliteConnectOptions;

/// Driver-level connect options, one variant per enabled backend.
#[derive(Debug, Clone)]
pub enum DbConnectOptions {
    #[cfg(feature = "pg")]
    Postgres(PgConnectOptions),
    #[cfg(feature = "sqlite")]
    Sqlite {
        opts: SqliteConnectOptions,
        /// `true` for `sqlite::memory:` style targets; the pool must then hold
        /// exactly one long-lived connection or the data disappears.
        in_memory: bool,
    },
}

impl DbConnectOptions {
    /// Build options from configuration.
    ///
    /// A configured `dsn` takes precedence. Without one, PostgreSQL options are
    /// assembled field by field from `host`, `port`, `dbname`, `user` and `password`.
    ///
    /// # Errors
    /// Returns an error if the DSN scheme is unknown, the matching backend
    /// feature is disabled, or the DSN cannot be parsed.
    pub fn from_config(cfg: &DbConnConfig) -> Result<Self> {
        match cfg.dsn.as_deref() {
            Some(dsn) => Self::from_dsn(dsn),
            None => Self::from_fields(cfg),
        }
    }

    fn from_dsn(dsn: &str) -> Result<Self> {
        let dsn = dsn.trim();
        match DbEngine::detect(dsn)? {
            DbEngine::Postgres => {
                #[cfg(feature = "pg")]
                {
                    let opts = PgConnectOptions::from_str(dsn)?;
                    Ok(Self::Postgres(opts))
                }
                #[cfg(not(feature = "pg"))]
                {
                    Err(DbError::FeatureDisabled("PostgreSQL feature not enabled"))
                }
            }
            DbEngine::Sqlite => {
                #[cfg(feature = "sqlite")]
                {
                    let in_memory = dsn.contains(":memory:") || dsn.contains("mode=memory");
                    let opts = SqliteConnectOptions::from_str(dsn)?.create_if_missing(true);
                    Ok(Self::Sqlite { opts, in_memory })
                }
                #[cfg(not(feature = "sqlite"))]
                {
                    Err(DbError::FeatureDisabled("SQLite feature not enabled"))
                }
            }
        }
    }

    #[cfg_attr(not(feature = "pg"), allow(unused_variables))]
    fn from_fields(cfg: &DbConnConfig) -> Result<Self> {
        if cfg.host.trim().is_empty() {
            return Err(DbError::InvalidParameter("database host is empty".to_owned()));
        }
        if cfg.dbname.trim().is_empty() {
            return Err(DbError::InvalidParameter(
                "database name is empty".to_owned(),
            ));
        }

        #[cfg(feature = "pg")]
        {
            let opts = PgConnectOptions::new()
                .host(&cfg.host)
                .port(cfg.port)
                .database(&cfg.dbname)
                .username(&cfg.user)
                .password(cfg.password.expose());
            Ok(Self::Postgres(opts))
        }
        #[cfg(not(feature = "pg"))]
        {
            Err(DbError::FeatureDisabled("PostgreSQL feature not enabled"))
        }
    }

    /// Engine these options target.
    #[must_use]
    pub fn engine(&self) -> DbEngine {
        match self {
            #[cfg(feature = "pg")]
            Self::Postgres(_) => DbEngine::Postgres,
            #[cfg(feature = "sqlite")]
            Self::Sqlite { .. } => DbEngine::Sqlite,
            #[cfg(not(any(feature = "pg", feature = "sqlite")))]
            _ => unreachable!("No database features enabled"),
        }
    }
}

impl fmt::Display for DbConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { opts, in_memory } => {
                let filename = opts.get_filename().display().to_string();
                if *in_memory || filename.is_empty() {
                    write!(f, "sqlite://memory")
                } else {
                    write!(f, "sqlite://{filename}")
                }
            }
            #[cfg(feature = "pg")]
            Self::Postgres(opts) => {
                write!(
                    f,
                    "postgresql://<redacted>@{}:{}/{}",
                    opts.get_host(),
                    opts.get_port(),
                    opts.get_database().unwrap_or("")
                )
            }
            #[cfg(not(any(feature = "pg", feature = "sqlite")))]
            _ => unreachable!("No database features enabled"),
        }
    }
}

/// Replace the password part of a DSN with `***` for logs and config dumps.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            } else {
                "***".to_owned()
            }
        }
        Some(dsn) => dsn.to_owned(),
        None => "none".to_owned(),
    }
}
