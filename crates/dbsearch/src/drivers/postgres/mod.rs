//! PostgreSQL driver.
//!
//! - [`PostgresDialect`]: catalog and search SQL for PostgreSQL
//! - `PostgresClient`: tokio-postgres connection with optional rustls TLS
//!   (feature `postgres`)
//! - `PostgresFactory`: registers the driver as `postgresql` (feature `postgres`)

mod dialect;

pub use dialect::PostgresDialect;

#[cfg(feature = "postgres")]
mod client;
#[cfg(feature = "postgres")]
mod tls;

#[cfg(feature = "postgres")]
pub use client::PostgresClient;

#[cfg(feature = "postgres")]
mod factory {
    use async_trait::async_trait;
    use tracing::debug;

    use crate::config::PostgresOptions;
    use crate::core::session::DialectSession;
    use crate::core::traits::{ConnectionFactory, DialectAdapter};
    use crate::error::Result;

    use super::{PostgresClient, PostgresDialect};

    /// Opens PostgreSQL adapters from libpq-style connection strings.
    #[derive(Debug, Clone, Default)]
    pub struct PostgresFactory {
        options: PostgresOptions,
    }

    impl PostgresFactory {
        pub fn new(options: PostgresOptions) -> Self {
            Self { options }
        }
    }

    #[async_trait]
    impl ConnectionFactory for PostgresFactory {
        fn dialect(&self) -> &str {
            "postgresql"
        }

        async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
            let client = PostgresClient::open(connection_string, self.options.ssl_mode).await?;
            let dialect = if self.options.cross_database {
                debug!("postgresql: searching every database");
                PostgresDialect::cross_database()
            } else {
                PostgresDialect::new()
            };
            Ok(Box::new(DialectSession::new(dialect, Box::new(client))))
        }
    }
}

#[cfg(feature = "postgres")]
pub use factory::PostgresFactory;
