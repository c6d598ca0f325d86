//! Oracle connection over ODBC.
//!
//! ODBC calls block, so one worker thread owns the connection for the
//! client's lifetime. Statements are sent to it as jobs; it fetches rows in
//! batches and hands each batch back over a bounded channel, so a result set
//! is read only as fast as the caller consumes it.

use std::sync::mpsc as job_channel;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::row::{utf8_cell, Row};
use crate::core::traits::{Connection, RowStream};
use crate::error::{Result, SearchError};

const DIALECT: &str = "oracle";

/// Rows fetched per ODBC round trip.
const FETCH_BATCH: usize = 1000;

/// Longest text value read from a cell, in bytes.
const MAX_TEXT_LEN: usize = 16384;

/// Fetched batches allowed to wait for the consumer.
const BATCHES_IN_FLIGHT: usize = 2;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// The process-wide ODBC environment.
fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| SearchError::connection(DIALECT, e))?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// A statement for the worker thread.
struct Job {
    sql: String,
    /// Answered once the statement has run and its buffers are bound.
    started: oneshot::Sender<Result<()>>,
    batches: mpsc::Sender<Result<Vec<Row>>>,
}

/// Oracle access through an ODBC driver manager.
pub struct OracleClient {
    jobs: Option<job_channel::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl OracleClient {
    /// Connect using an ODBC connection string
    /// (`Driver={Oracle 21 ODBC driver};Dbq=//host:1521/ORCLPDB1;Uid=...;Pwd=...`).
    pub async fn open(connection_string: &str) -> Result<Self> {
        let env = environment()?;
        let connection_string = connection_string.to_string();
        let (jobs, job_rx) = job_channel::channel::<Job>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        let worker = std::thread::Builder::new()
            .name("dbsearch-oracle".into())
            .spawn(move || {
                let conn = match env
                    .connect_with_connection_string(&connection_string, ConnectionOptions::default())
                {
                    Ok(conn) => conn,
                    Err(e) => {
                        let _ = ready_tx.send(Err(SearchError::connection(DIALECT, e)));
                        return;
                    }
                };
                if ready_tx.send(Ok(())).is_err() {
                    return;
                }
                // Runs until the client drops its job sender.
                for job in job_rx {
                    run_job(&conn, job);
                }
                debug!("oracle connection closed");
            })
            .map_err(|e| SearchError::connection(DIALECT, e))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                return Err(SearchError::connection(
                    DIALECT,
                    "ODBC worker exited before connecting",
                ))
            }
        }

        info!("connected to Oracle via ODBC");
        Ok(Self {
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }
}

#[async_trait]
impl Connection for OracleClient {
    fn dialect(&self) -> &str {
        DIALECT
    }

    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>> {
        let jobs = self.jobs.as_ref().ok_or_else(|| SearchError::closed(DIALECT))?;
        debug!("oracle: {}", sql);

        let (started, started_rx) = oneshot::channel();
        let (batches, batch_rx) = mpsc::channel(BATCHES_IN_FLIGHT);
        jobs.send(Job {
            sql,
            started,
            batches,
        })
        .map_err(|_| SearchError::connection(DIALECT, "ODBC worker is gone"))?;

        started_rx
            .await
            .map_err(|_| SearchError::query(DIALECT, "ODBC worker dropped the statement"))??;
        Ok(batch_stream(batch_rx))
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the sender ends the worker's job loop, which drops the
        // ODBC connection.
        if self.jobs.take().is_none() {
            return Ok(());
        }
        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(|e| SearchError::query(DIALECT, e))?
                .map_err(|_| SearchError::query(DIALECT, "ODBC worker panicked"))?;
        }
        Ok(())
    }
}

impl Drop for OracleClient {
    fn drop(&mut self) {
        if self.jobs.is_some() {
            warn!("oracle client dropped without close");
        }
    }
}

/// Rows in fetch order, one batch at a time.
fn batch_stream(batches: mpsc::Receiver<Result<Vec<Row>>>) -> RowStream<'static> {
    stream::unfold(batches, |mut rx| async move {
        rx.recv().await.map(|batch| (batch, rx))
    })
    .map_ok(|rows| stream::iter(rows.into_iter().map(Ok)))
    .try_flatten()
    .boxed()
}

fn run_job(conn: &odbc_api::Connection<'static>, job: Job) {
    let Job {
        sql,
        started,
        batches,
    } = job;
    if let Err(e) = fetch_batches(conn, &sql, started, &batches) {
        // Errors after the start are reported in the stream.
        let _ = batches.blocking_send(Err(e));
    }
}

/// Run one statement. Errors before the cursor is bound go to `started`;
/// later ones are returned.
fn fetch_batches(
    conn: &odbc_api::Connection<'static>,
    sql: &str,
    started: oneshot::Sender<Result<()>>,
    batches: &mpsc::Sender<Result<Vec<Row>>>,
) -> Result<()> {
    let mut cursor = match conn.execute(sql, ()) {
        Ok(Some(cursor)) => cursor,
        Ok(None) => {
            let _ = started.send(Ok(()));
            return Ok(());
        }
        Err(e) => return reject(started, SearchError::query(DIALECT, e)),
    };
    let columns = match column_names(&mut cursor) {
        Ok(columns) => columns,
        Err(e) => return reject(started, e),
    };
    let buffers = match TextRowSet::for_cursor(FETCH_BATCH, &mut cursor, Some(MAX_TEXT_LEN)) {
        Ok(buffers) => buffers,
        Err(e) => return reject(started, SearchError::query(DIALECT, e)),
    };
    let mut row_cursor = match cursor.bind_buffer(buffers) {
        Ok(row_cursor) => row_cursor,
        Err(e) => return reject(started, SearchError::query(DIALECT, e)),
    };
    if started.send(Ok(())).is_err() {
        return Ok(());
    }

    while let Some(batch) = row_cursor
        .fetch()
        .map_err(|e| SearchError::query(DIALECT, e))?
    {
        let mut rows = Vec::with_capacity(batch.num_rows());
        for row_idx in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(columns.len());
            for (col_idx, column) in columns.iter().enumerate() {
                let value = match batch.at(col_idx, row_idx) {
                    Some(bytes) => Some(utf8_cell(DIALECT, column, bytes.to_vec())?),
                    None => None,
                };
                values.push(value);
            }
            rows.push(Row::new(columns.clone(), values));
        }
        // A dropped stream stops the fetch and releases the cursor.
        if batches.blocking_send(Ok(rows)).is_err() {
            debug!("oracle result stream dropped, cursor released");
            break;
        }
    }
    Ok(())
}

fn reject(started: oneshot::Sender<Result<()>>, error: SearchError) -> Result<()> {
    let _ = started.send(Err(error));
    Ok(())
}

fn column_names(cursor: &mut impl ResultSetMetadata) -> Result<Arc<[String]>> {
    let num_cols = cursor
        .num_result_cols()
        .map_err(|e| SearchError::query(DIALECT, e))?;
    let mut columns = Vec::with_capacity(num_cols.max(0) as usize);
    for i in 1..=num_cols {
        columns.push(
            cursor
                .col_name(i as u16)
                .map_err(|e| SearchError::query(DIALECT, e))?,
        );
    }
    Ok(columns.into())
}
