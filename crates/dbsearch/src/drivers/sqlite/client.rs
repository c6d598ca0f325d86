//! SQLite connection over SQLx.

use std::str::FromStr;

use async_trait::async_trait;
use futures::future;
use futures::stream::{StreamExt, TryStreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as _, Connection as _, Row as _, ValueRef as _};
use tracing::{debug, info};

use crate::core::row::Row;
use crate::core::traits::{Connection, RowStream};
use crate::error::{Result, SearchError};

const DIALECT: &str = "sqlite";

/// One SQLite connection, opened read-only.
pub struct SqliteClient {
    conn: Option<SqliteConnection>,
    /// Text of the in-flight statement; its result stream borrows it.
    statement: String,
}

impl SqliteClient {
    /// Open a database file. Accepts a plain path or a `sqlite://` URL.
    ///
    /// The file must exist; searching never creates or modifies a database.
    pub async fn open(connection_string: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(connection_string)
            .map_err(|e| SearchError::connection(DIALECT, e))?
            .read_only(true)
            .create_if_missing(false);
        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| SearchError::connection(DIALECT, e))?;
        info!(database = %connection_string, "opened SQLite database");
        Ok(Self {
            conn: Some(conn),
            statement: String::new(),
        })
    }
}

#[async_trait]
impl Connection for SqliteClient {
    fn dialect(&self) -> &str {
        DIALECT
    }

    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>> {
        let conn = self.conn.as_mut().ok_or_else(|| SearchError::closed(DIALECT))?;
        self.statement = sql;
        debug!("sqlite: {}", self.statement);

        let rows = sqlx::raw_sql(&self.statement)
            .fetch(conn)
            .map_err(|e| SearchError::query(DIALECT, e))
            .and_then(|row| future::ready(text_row(&row)));
        Ok(rows.boxed())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| SearchError::query(DIALECT, e))?;
            debug!("sqlite connection closed");
        }
        Ok(())
    }
}

fn text_row(row: &SqliteRow) -> Result<Row> {
    let columns: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    let mut values = Vec::with_capacity(columns.len());
    for i in 0..columns.len() {
        let is_null = row
            .try_get_raw(i)
            .map(|r| r.is_null())
            .map_err(|e| SearchError::query(DIALECT, e))?;
        if is_null {
            values.push(None);
            continue;
        }
        // SQLite converts integers and reals to text on request.
        let text: String = row
            .try_get_unchecked(i)
            .map_err(|e| SearchError::query(DIALECT, e))?;
        values.push(Some(text));
    }
    Ok(Row::new(columns, values))
}
