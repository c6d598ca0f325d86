//! PostgreSQL connection over tokio-postgres.
//!
//! Statements run through the simple query protocol, which returns every
//! cell as text.

use async_trait::async_trait;
use futures::future;
use futures::stream::{StreamExt, TryStreamExt};
use tokio::task::JoinHandle;
use tokio_postgres::{NoTls, SimpleQueryMessage, SimpleQueryRow};
use tracing::{debug, info, warn};

use crate::config::SslMode;
use crate::core::row::Row;
use crate::core::traits::{Connection, RowStream};
use crate::error::{Result, SearchError};

use super::tls::make_tls;

const DIALECT: &str = "postgresql";

/// One PostgreSQL connection and the task driving its socket.
pub struct PostgresClient {
    client: Option<tokio_postgres::Client>,
    driver: Option<JoinHandle<()>>,
}

impl PostgresClient {
    /// Connect using a libpq-style key/value string or a `postgresql://` URL.
    pub async fn open(connection_string: &str, ssl_mode: SslMode) -> Result<Self> {
        let config: tokio_postgres::Config = connection_string
            .parse()
            .map_err(|e| SearchError::connection(DIALECT, e))?;

        let (client, driver) = match make_tls(ssl_mode) {
            Some(tls) => {
                let (client, connection) = config
                    .connect(tls)
                    .await
                    .map_err(|e| SearchError::connection(DIALECT, e))?;
                (client, tokio::spawn(drive(connection)))
            }
            None => {
                let (client, connection) = config
                    .connect(NoTls)
                    .await
                    .map_err(|e| SearchError::connection(DIALECT, e))?;
                (client, tokio::spawn(drive(connection)))
            }
        };

        info!(dbname = ?config.get_dbname(), "connected to PostgreSQL");
        Ok(Self {
            client: Some(client),
            driver: Some(driver),
        })
    }
}

async fn drive<C>(connection: C)
where
    C: std::future::Future<Output = std::result::Result<(), tokio_postgres::Error>>,
{
    if let Err(e) = connection.await {
        warn!("PostgreSQL connection error: {}", e);
    }
}

#[async_trait]
impl Connection for PostgresClient {
    fn dialect(&self) -> &str {
        DIALECT
    }

    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>> {
        let client = self.client.as_ref().ok_or_else(|| SearchError::closed(DIALECT))?;
        debug!("postgresql: {}", sql);

        let messages = client
            .simple_query_raw(&sql)
            .await
            .map_err(|e| SearchError::query(DIALECT, e))?;
        let rows = messages
            .map_err(|e| SearchError::query(DIALECT, e))
            .try_filter_map(|message| {
                future::ready(Ok(match message {
                    SimpleQueryMessage::Row(row) => Some(text_row(&row)),
                    _ => None,
                }))
            });
        Ok(rows.boxed())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the client ends the session; the driver task then finishes.
        if self.client.take().is_some() {
            if let Some(driver) = self.driver.take() {
                driver
                    .await
                    .map_err(|e| SearchError::query(DIALECT, e))?;
            }
            debug!("postgresql connection closed");
        }
        Ok(())
    }
}

fn text_row(row: &SimpleQueryRow) -> Row {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let values = (0..row.len()).map(|i| row.get(i).map(str::to_owned)).collect();
    Row::new(columns, values)
}
