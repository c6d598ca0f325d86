//! MySQL/MariaDB driver.
//!
//! - [`MysqlDialect`]: catalog and search SQL for MySQL
//! - `MysqlClient`: SQLx connection (feature `mysql`)
//! - `MysqlFactory`: registers the driver as `mysql` (feature `mysql`)

mod dialect;

pub use dialect::MysqlDialect;

#[cfg(feature = "mysql")]
mod client;

#[cfg(feature = "mysql")]
pub use client::MysqlClient;

#[cfg(feature = "mysql")]
mod factory {
    use async_trait::async_trait;

    use crate::core::session::DialectSession;
    use crate::core::traits::{ConnectionFactory, DialectAdapter};
    use crate::error::Result;

    use super::{MysqlClient, MysqlDialect};

    /// Opens MySQL adapters from SQLx connection URLs.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct MysqlFactory;

    #[async_trait]
    impl ConnectionFactory for MysqlFactory {
        fn dialect(&self) -> &str {
            "mysql"
        }

        async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>> {
            let client = MysqlClient::open(connection_string).await?;
            Ok(Box::new(DialectSession::new(MysqlDialect::new(), Box::new(client))))
        }
    }
}

#[cfg(feature = "mysql")]
pub use factory::MysqlFactory;
