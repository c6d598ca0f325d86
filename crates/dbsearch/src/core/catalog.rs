//! Dialect catalog for explicit dependency injection.
//!
//! The [`DialectCatalog`] maps dialect names to the factories that open
//! adapters for them. It is a plain value built at startup and passed to
//! whoever resolves connections, rather than a process-wide singleton, so
//! tests can build catalogs holding only mock factories.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::DriverOptions;
use crate::error::{Result, SearchError};

use super::traits::{ConnectionFactory, DialectAdapter};

/// Registry of dialect factories by name.
///
/// # Example
///
/// ```rust,no_run
/// use dbsearch::config::DriverOptions;
/// use dbsearch::core::{DialectAdapter, DialectCatalog};
///
/// # async fn run() -> dbsearch::Result<()> {
/// let catalog = DialectCatalog::with_builtins(&DriverOptions::default());
/// let mut adapter = catalog.open("sqlite", "people.db").await?;
/// let tables = adapter.materialize_tables().await?;
/// adapter.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct DialectCatalog {
    factories: HashMap<String, Arc<dyn ConnectionFactory>>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with every dialect compiled into this build.
    ///
    /// Registered names: `mysql`, `oracle`, `postgresql`, `sqlite`,
    /// `sqlserver`, each behind its Cargo feature.
    #[allow(unused_variables, unused_mut)]
    pub fn with_builtins(options: &DriverOptions) -> Self {
        let mut catalog = Self::new();

        #[cfg(feature = "mysql")]
        catalog.register_factory(Arc::new(crate::drivers::mysql::MysqlFactory));

        #[cfg(feature = "oracle")]
        catalog.register_factory(Arc::new(crate::drivers::oracle::OracleFactory));

        #[cfg(feature = "postgres")]
        catalog.register_factory(Arc::new(crate::drivers::postgres::PostgresFactory::new(
            options.postgres.clone(),
        )));

        #[cfg(feature = "sqlite")]
        catalog.register_factory(Arc::new(crate::drivers::sqlite::SqliteFactory));

        #[cfg(feature = "mssql")]
        catalog.register_factory(Arc::new(crate::drivers::mssql::MssqlFactory));

        debug!("dialect catalog: {:?}", catalog.dialect_names());
        catalog
    }

    /// Register a factory under `name`, replacing any previous registration.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidArgument` if `name` is empty.
    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn ConnectionFactory>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(SearchError::InvalidArgument(
                "dialect name cannot be empty".to_string(),
            ));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Register a factory under its own dialect name.
    fn register_factory(&mut self, factory: Arc<dyn ConnectionFactory>) {
        self.factories.insert(factory.dialect().to_string(), factory);
    }

    /// Check if a dialect is registered.
    pub fn has_dialect(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered dialect names, sorted.
    pub fn dialect_names(&self) -> BTreeSet<String> {
        self.factories.keys().cloned().collect()
    }

    /// Open an adapter for `name`, or `None` when no such dialect is registered.
    ///
    /// # Errors
    ///
    /// Whatever the factory returns, typically `SearchError::Connection`.
    pub async fn resolve(&self, name: &str, connection_string: &str) -> Result<Option<Box<dyn DialectAdapter>>> {
        let Some(factory) = self.factories.get(name) else {
            return Ok(None);
        };
        info!(dialect = name, "opening connection");
        factory.open(connection_string).await.map(Some)
    }

    /// Like [`resolve`](Self::resolve), with an unknown name reported as
    /// `SearchError::UnregisteredDialect`.
    pub async fn open(&self, name: &str, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
        self.resolve(name, connection_string)
            .await?
            .ok_or_else(|| SearchError::UnregisteredDialect(name.to_string()))
    }
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectCatalog")
            .field("dialects", &self.dialect_names())
            .finish()
    }
}
