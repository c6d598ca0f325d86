//! SQL Server connection over Tiberius.

use async_trait::async_trait;
use futures::future;
use futures::stream::{StreamExt, TryStreamExt};
use tiberius::{Client, ColumnData, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::core::row::Row;
use crate::core::traits::{Connection, RowStream};
use crate::error::{Result, SearchError};

const DIALECT: &str = "sqlserver";

/// One SQL Server connection.
pub struct MssqlClient {
    client: Option<Client<Compat<TcpStream>>>,
}

impl MssqlClient {
    /// Connect using an ADO.NET connection string
    /// (`server=tcp:host,1433;user=sa;password=...;TrustServerCertificate=true`).
    pub async fn open(connection_string: &str) -> Result<Self> {
        let config = Config::from_ado_string(connection_string)
            .map_err(|e| SearchError::connection(DIALECT, e))?;

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| SearchError::connection(DIALECT, e))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| SearchError::connection(DIALECT, e))?;
        info!("connected to SQL Server");
        Ok(Self { client: Some(client) })
    }
}

#[async_trait]
impl Connection for MssqlClient {
    fn dialect(&self) -> &str {
        DIALECT
    }

    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>> {
        let client = self.client.as_mut().ok_or_else(|| SearchError::closed(DIALECT))?;
        debug!("sqlserver: {}", sql);

        let rows = client
            .simple_query(sql)
            .await
            .map_err(|e| SearchError::query(DIALECT, e))?
            .into_row_stream()
            .map_err(|e| SearchError::query(DIALECT, e))
            .and_then(|row| future::ready(text_row(row)));
        Ok(rows.boxed())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| SearchError::query(DIALECT, e))?;
            debug!("sqlserver connection closed");
        }
        Ok(())
    }
}

fn text_row(row: tiberius::Row) -> Result<Row> {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let values = row
        .into_iter()
        .map(cell_text)
        .collect::<Result<Vec<_>>>()?;
    Ok(Row::new(columns, values))
}

/// Text of one cell. Search statements cast every column to NVARCHAR, so
/// only catalog queries produce the non-string variants.
fn cell_text(data: ColumnData<'static>) -> Result<Option<String>> {
    Ok(match data {
        ColumnData::String(v) => v.map(|s| s.into_owned()),
        ColumnData::U8(v) => v.map(|n| n.to_string()),
        ColumnData::I16(v) => v.map(|n| n.to_string()),
        ColumnData::I32(v) => v.map(|n| n.to_string()),
        ColumnData::I64(v) => v.map(|n| n.to_string()),
        ColumnData::F32(v) => v.map(|n| n.to_string()),
        ColumnData::F64(v) => v.map(|n| n.to_string()),
        ColumnData::Bit(v) => v.map(|b| if b { "1" } else { "0" }.to_string()),
        ColumnData::Guid(v) => v.map(|g| g.to_string()),
        ColumnData::Numeric(v) => v.map(|n| n.to_string()),
        other => {
            return Err(SearchError::InvalidState(format!(
                "sqlserver returned a value that cannot be read as text: {:?}",
                other
            )))
        }
    })
}
