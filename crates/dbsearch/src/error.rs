//! Error types for the search library.

use thiserror::Error;

/// Main error type for introspection and search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A caller-supplied or catalog-supplied value violates a precondition
    /// (missing identity component, wrong arity, empty column name).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening the underlying connection failed.
    #[error("Connection error ({dialect}): {message}")]
    Connection { dialect: String, message: String },

    /// A statement failed to execute or its results failed to fetch.
    #[error("Query failed ({dialect}): {message}")]
    Query { dialect: String, message: String },

    /// An operation hit a state it cannot proceed from (NULL primary key
    /// value, closed connection, undecodable driver value).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No dialect is registered under the requested name.
    #[error("Unregistered dialect '{0}'")]
    UnregisteredDialect(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    /// Create a Connection error for the given dialect.
    pub fn connection(dialect: impl Into<String>, message: impl std::fmt::Display) -> Self {
        SearchError::Connection {
            dialect: dialect.into(),
            message: message.to_string(),
        }
    }

    /// Create a Query error for the given dialect.
    pub fn query(dialect: impl Into<String>, message: impl std::fmt::Display) -> Self {
        SearchError::Query {
            dialect: dialect.into(),
            message: message.to_string(),
        }
    }

    /// Error returned by any connection operation after `close`.
    pub fn closed(dialect: &str) -> Self {
        SearchError::InvalidState(format!("{} connection is closed", dialect))
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SearchError::InvalidArgument(_)
            | SearchError::UnregisteredDialect(_)
            | SearchError::Config(_)
            | SearchError::Yaml(_) => 2,
            SearchError::Connection { .. } => 3,
            SearchError::Query { .. } => 4,
            SearchError::InvalidState(_) => 5,
            SearchError::Io(_) | SearchError::Json(_) => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
