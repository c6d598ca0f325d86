//! Oracle driver.
//!
//! - [`OracleDialect`]: catalog and search SQL for Oracle
//! - `OracleClient`: ODBC connection (feature `oracle`)
//! - `OracleFactory`: registers the driver as `oracle` (feature `oracle`)

mod dialect;

pub use dialect::OracleDialect;

#[cfg(feature = "oracle")]
mod client;

#[cfg(feature = "oracle")]
pub use client::OracleClient;

#[cfg(feature = "oracle")]
mod factory {
    use async_trait::async_trait;

    use crate::core::session::DialectSession;
    use crate::core::traits::{ConnectionFactory, DialectAdapter};
    use crate::error::Result;

    use super::{OracleClient, OracleDialect};

    /// Opens Oracle adapters from ODBC connection strings.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct OracleFactory;

    #[async_trait]
    impl ConnectionFactory for OracleFactory {
        fn dialect(&self) -> &str {
            "oracle"
        }

        async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
            let client = OracleClient::open(connection_string).await?;
            Ok(Box::new(DialectSession::new(OracleDialect::new(), Box::new(client))))
        }
    }
}

#[cfg(feature = "oracle")]
pub use factory::OracleFactory;
