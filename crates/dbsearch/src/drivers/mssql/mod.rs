//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: catalog and search SQL for SQL Server
//! - `MssqlClient`: Tiberius connection (feature `mssql`)
//! - `MssqlFactory`: registers the driver as `sqlserver` (feature `mssql`)

mod dialect;

pub use dialect::MssqlDialect;

#[cfg(feature = "mssql")]
mod client;

#[cfg(feature = "mssql")]
pub use client::MssqlClient;

#[cfg(feature = "mssql")]
mod factory {
    use async_trait::async_trait;

    use crate::core::session::DialectSession;
    use crate::core::traits::{ConnectionFactory, DialectAdapter};
    use crate::error::Result;

    use super::{MssqlClient, MssqlDialect};

    /// Opens SQL Server adapters from ADO.NET connection strings.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MssqlFactory;

    #[async_trait]
    impl ConnectionFactory for MssqlFactory {
        fn dialect(&self) -> &str {
            "sqlserver"
        }

        async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
            let client = MssqlClient::open(connection_string).await?;
            Ok(Box::new(DialectSession::new(MssqlDialect::new(), Box::new(client))))
        }
    }
}

#[cfg(feature = "mssql")]
pub use factory::MssqlFactory;
