//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use std::io::Write;

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
dialect: postgresql
connection: "host=localhost user=search dbname=app"
search:
  continue_on_error: true
postgres:
  cross_database: true
  ssl_mode: verify-full
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.dialect.as_deref(), Some("postgresql"));
        assert!(config.search.continue_on_error);
        assert!(config.postgres.cross_database);
        assert_eq!(config.postgres.ssl_mode, SslMode::VerifyFull);
        assert_eq!(config.driver_options().postgres, config.postgres);
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml("dialect: sqlite\n").unwrap();
        assert_eq!(config.connection, None);
        assert!(!config.search.continue_on_error);
        assert!(!config.postgres.cross_database);
        assert_eq!(config.postgres.ssl_mode, SslMode::Disable);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_fields() {
        let err = Config::from_yaml("dialect: sqlite\nworkers: 4\n").unwrap_err();
        assert!(matches!(err, SearchError::Yaml(_)));
    }

    #[test]
    fn test_from_yaml_rejects_bad_ssl_mode() {
        assert!(Config::from_yaml("postgres:\n  ssl_mode: sometimes\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dialect: mysql\nconnection: mysql://root@localhost/app").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connection.as_deref(), Some("mysql://root@localhost/app"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/dbsearch.yaml").unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }

    #[test]
    fn test_ssl_mode_parsing() {
        assert_eq!(SslMode::parse("disable").unwrap(), SslMode::Disable);
        assert_eq!(SslMode::parse("Require").unwrap(), SslMode::Require);
        assert_eq!(SslMode::parse("verify-ca").unwrap(), SslMode::VerifyCa);
        assert_eq!(SslMode::parse("").unwrap(), SslMode::Disable);
        assert!(SslMode::parse("invalid").is_err());
        assert!(!SslMode::Disable.requires_tls());
        assert!(SslMode::VerifyFull.requires_tls());
    }
}
