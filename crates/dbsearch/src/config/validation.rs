//! Configuration validation.

use super::Config;
use crate::error::{Result, SearchError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if let Some(dialect) = &config.dialect {
        if dialect.trim().is_empty() {
            return Err(SearchError::Config("dialect cannot be empty".into()));
        }
    }

    if let Some(connection) = &config.connection {
        if connection.trim().is_empty() {
            return Err(SearchError::Config("connection cannot be empty".into()));
        }
    }

    if config.postgres.cross_database {
        if let Some(dialect) = config.dialect.as_deref() {
            if dialect != "postgresql" {
                return Err(SearchError::Config(format!(
                    "postgres.cross_database only applies to the postgresql dialect, not '{}'",
                    dialect
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_dialect_rejected() {
        let config = Config {
            dialect: Some("  ".into()),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("dialect cannot be empty"));
    }

    #[test]
    fn test_empty_connection_rejected() {
        let config = Config {
            connection: Some(String::new()),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_cross_database_requires_postgres() {
        let mut config = Config {
            dialect: Some("mysql".into()),
            ..Default::default()
        };
        config.postgres.cross_database = true;
        assert!(validate(&config).is_err());

        config.dialect = Some("postgresql".into());
        assert!(validate(&config).is_ok());
    }
}
