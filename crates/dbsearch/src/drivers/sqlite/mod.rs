//! SQLite driver.
//!
//! - [`SqliteDialect`]: catalog and search SQL for SQLite
//! - `SqliteClient`: read-only SQLx connection (feature `sqlite`)
//! - `SqliteFactory`: registers the driver as `sqlite` (feature `sqlite`)

mod dialect;

pub use dialect::SqliteDialect;

#[cfg(feature = "sqlite")]
mod client;

#[cfg(feature = "sqlite")]
pub use client::SqliteClient;

#[cfg(feature = "sqlite")]
mod factory {
    use async_trait::async_trait;

    use crate::core::session::DialectSession;
    use crate::core::traits::{ConnectionFactory, DialectAdapter};
    use crate::error::Result;

    use super::{SqliteClient, SqliteDialect};

    /// Opens SQLite adapters from file paths or `sqlite://` URLs.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SqliteFactory;

    #[async_trait]
    impl ConnectionFactory for SqliteFactory {
        fn dialect(&self) -> &str {
            "sqlite"
        }

        async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
            let client = SqliteClient::open(connection_string).await?;
            Ok(Box::new(DialectSession::new(SqliteDialect::new(), Box::new(client))))
        }
    }
}

#[cfg(feature = "sqlite")]
pub use factory::SqliteFactory;
