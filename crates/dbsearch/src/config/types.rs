//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Root configuration structure.
///
/// Every field is optional in the file; command line arguments fill in or
/// override what the file leaves out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Dialect name as registered in the catalog (mysql, oracle, postgresql,
    /// sqlite, sqlserver).
    #[serde(default)]
    pub dialect: Option<String>,

    /// Driver-specific connection string.
    #[serde(default)]
    pub connection: Option<String>,

    /// Search behavior.
    #[serde(default)]
    pub search: SearchConfig,

    /// PostgreSQL driver options.
    #[serde(default)]
    pub postgres: PostgresOptions,
}

impl Config {
    /// Options handed to the dialect catalog when building factories.
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            postgres: self.postgres.clone(),
        }
    }
}

/// Search behavior configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Log and skip tables whose definition or search fails instead of
    /// aborting the run (default: false).
    #[serde(default)]
    pub continue_on_error: bool,
}

/// PostgreSQL options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresOptions {
    /// List tables of every database in `pg_database` and name them
    /// `database.schema.table` (default: false, current database only).
    #[serde(default)]
    pub cross_database: bool,

    /// TLS mode (default: disable).
    #[serde(default)]
    pub ssl_mode: SslMode,
}

/// Per-driver options collected from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverOptions {
    pub postgres: PostgresOptions,
}

/// SSL verification modes for PostgreSQL connections.
///
/// These modes match PostgreSQL's standard `sslmode` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// No SSL/TLS (plain TCP connection).
    #[default]
    Disable,
    /// Use SSL but don't verify server certificate.
    Require,
    /// Verify server certificate against CA.
    VerifyCa,
    /// Full certificate and hostname verification.
    VerifyFull,
}

impl SslMode {
    /// Parse an SSL mode from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" | "" => Ok(SslMode::Disable),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(SearchError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disable, require, verify-ca, verify-full",
                other
            ))),
        }
    }

    /// Check if this mode requires TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self, SslMode::Disable)
    }
}
