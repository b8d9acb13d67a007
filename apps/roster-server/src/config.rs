//! Layered application configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults,
//! 2. an optional YAML file (`--config`),
//! 3. the deployment variables `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `PORT`,
//! 4. `ROSTER__`-prefixed variables with `__` as the nesting separator
//!    (e.g. `ROSTER__DATABASE__POOL__MAX_CONNS=20`),
//! 5. command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use roster_db::{DbConnConfig, DbConnectOptions};
use serde::{Deserialize, Serialize};

/// Prefix for structured environment overrides.
pub const ENV_PREFIX: &str = "ROSTER__";

/// Flat deployment variables, the config keys they feed and how their values are read.
const LEGACY_ENV: &[(&str, &str, LegacyValue)] = &[
    ("DB_HOST", "database.host", LegacyValue::Text),
    ("DB_PORT", "database.port", LegacyValue::Port),
    ("DB_NAME", "database.dbname", LegacyValue::Text),
    ("DB_USER", "database.user", LegacyValue::Text),
    ("DB_PASSWORD", "database.password", LegacyValue::Text),
    ("PORT", "server.port", LegacyValue::Port),
];

#[derive(Clone, Copy)]
enum LegacyValue {
    /// Taken verbatim, even when it looks like a number or a boolean.
    Text,
    /// Parsed as a port; anything else is passed on as text and rejected on extract.
    Port,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConnConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests still running after this long are answered with 504.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5000,
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 64 * 1024,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy. The defaults allow every origin, method and header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_seconds: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: vec!["*".to_owned()],
            allowed_headers: vec!["*".to_owned()],
            allow_credentials: false,
            max_age_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` replaces it when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Provider chain without CLI overrides; unset keys fall back to the serde defaults.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(legacy_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate configuration from defaults, an optional file and the environment.
    ///
    /// # Errors
    /// Returns an error if the file does not exist, a source cannot be parsed,
    /// or the merged values are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path
            && !path.is_file()
        {
            bail!("config file does not exist: {}", path.display());
        }
        let config: Self = Self::figment(path)
            .extract()
            .context("failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if args.mock {
            let retry = self.database.schema_retry_interval;
            self.database = DbConnConfig::sqlite_memory();
            self.database.schema_retry_interval = retry;
        }
        // -v info, -vv debug, -vvv trace
        let level = match args.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            self.logging.level = level.to_owned();
        }
    }

    /// Check values that deserialize fine but cannot run.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        if self.server.request_timeout.is_zero() {
            bail!("server.request_timeout must be greater than zero");
        }
        if self.server.body_limit_bytes == 0 {
            bail!("server.body_limit_bytes must be greater than zero");
        }
        if self.database.schema_retry_interval.is_zero() {
            bail!("database.schema_retry_interval must be greater than zero");
        }
        DbConnectOptions::from_config(&self.database).context("invalid database settings")?;
        Ok(())
    }

    /// Pretty JSON rendering with secrets redacted.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration")
    }
}

/// Deployment variables as a provider. Unlike [`Env`], values are not type-sniffed,
/// so `DB_NAME=2024` or `DB_PASSWORD=true` stay strings.
fn legacy_env() -> Figment {
    LEGACY_ENV
        .iter()
        .fold(Figment::new(), |figment, &(name, key, kind)| {
            let Ok(raw) = std::env::var(name) else {
                return figment;
            };
            match (kind, raw.trim().parse::<u16>()) {
                (LegacyValue::Port, Ok(port)) => figment.merge(Serialized::default(key, port)),
                _ => figment.merge(Serialized::default(key, raw)),
            }
        })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(jail_file: Option<&str>) -> figment::error::Result<AppConfig> {
        AppConfig::load(jail_file.map(Path::new)).map_err(|e| format!("{e:#}").into())
    }

    #[test]
    fn defaults_without_any_source() {
        Jail::expect_with(|_jail| {
            let cfg = load(None)?;
            assert_eq!(cfg.server.host, "0.0.0.0");
            assert_eq!(cfg.server.port, 5000);
            assert_eq!(cfg.server.request_timeout, Duration::from_secs(30));
            assert_eq!(cfg.database.host, "postgres-service");
            assert_eq!(cfg.database.dbname, "studentdb");
            assert_eq!(cfg.logging.level, "info");
            assert_eq!(cfg.logging.format, LogFormat::Text);
            assert_eq!(cfg.server.cors.allowed_origins, vec!["*".to_owned()]);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "roster.yaml",
                r"
server:
  port: 8081
  request_timeout: 5s
database:
  host: db.internal
  pool:
    max_conns: 3
logging:
  format: json
",
            )?;
            let cfg = load(Some("roster.yaml"))?;
            assert_eq!(cfg.server.port, 8081);
            assert_eq!(cfg.server.request_timeout, Duration::from_secs(5));
            assert_eq!(cfg.database.host, "db.internal");
            assert_eq!(cfg.database.pool.max_conns, Some(3));
            assert_eq!(cfg.database.port, 5432);
            assert_eq!(cfg.logging.format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn deployment_variables_override_file() {
        Jail::expect_with(|jail| {
            jail.create_file("roster.yaml", "database:\n  host: from-file\n")?;
            jail.set_env("DB_HOST", "from-env");
            jail.set_env("DB_PORT", "6543");
            jail.set_env("DB_NAME", "school");
            jail.set_env("DB_USER", "teacher");
            jail.set_env("DB_PASSWORD", "1234");
            jail.set_env("PORT", "7000");

            let cfg = load(Some("roster.yaml"))?;
            assert_eq!(cfg.database.host, "from-env");
            assert_eq!(cfg.database.port, 6543);
            assert_eq!(cfg.database.dbname, "school");
            assert_eq!(cfg.database.user, "teacher");
            assert_eq!(cfg.database.password.expose(), "1234");
            assert_eq!(cfg.server.port, 7000);
            Ok(())
        });
    }

    #[test]
    fn deployment_variables_are_read_as_text() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_NAME", "2024");
            jail.set_env("DB_USER", "1.5");
            jail.set_env("DB_PASSWORD", "true");
            jail.set_env("DB_HOST", "10");

            let cfg = load(None)?;
            assert_eq!(cfg.database.dbname, "2024");
            assert_eq!(cfg.database.user, "1.5");
            assert_eq!(cfg.database.password.expose(), "true");
            assert_eq!(cfg.database.host, "10");
            Ok(())
        });
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_PORT", "postgres");
            let err = load(None).unwrap_err();
            assert!(err.to_string().contains("port"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win_over_deployment_variables() {
        Jail::expect_with(|jail| {
            jail.set_env("PORT", "7000");
            jail.set_env("ROSTER__SERVER__PORT", "7100");
            jail.set_env("ROSTER__DATABASE__POOL__MAX_CONNS", "20");

            let cfg = load(None)?;
            assert_eq!(cfg.server.port, 7100);
            assert_eq!(cfg.database.pool.max_conns, Some(20));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("roster.yaml", "server:\n  prot: 1\n")?;
            let err = load(Some("roster.yaml")).unwrap_err();
            assert!(err.to_string().contains("prot"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = load(Some("absent.yaml")).unwrap_err();
            assert!(err.to_string().contains("config file does not exist"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_fails_validation() {
        Jail::expect_with(|jail| {
            jail.create_file("roster.yaml", "server:\n  request_timeout: 0s\n")?;
            let err = load(Some("roster.yaml")).unwrap_err();
            assert!(err.to_string().contains("request_timeout"), "{err}");
            Ok(())
        });
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(&CliArgs {
            port: Some(9999),
            verbose: 2,
            mock: true,
            ..Default::default()
        });
        assert_eq!(cfg.server.port, 9999);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.database.dsn.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn no_verbose_flag_keeps_configured_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "warn".to_owned();
        cfg.apply_cli_overrides(&CliArgs::default());
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn json_dump_redacts_password() {
        let mut cfg = AppConfig::default();
        cfg.database.password = roster_db::SecretString::new("hunter2");
        let json = cfg.to_json().unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("[REDACTED]"));
    }
}
