//! In-memory [`Connection`] for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::{Result, SearchError};

use super::row::Row;
use super::traits::{Connection, RowStream};

/// Replays canned result sets in order and records every statement.
pub(crate) struct ScriptedConnection {
    responses: VecDeque<Vec<Row>>,
    executed: Arc<Mutex<Vec<String>>>,
    closes: Arc<Mutex<usize>>,
    closed: bool,
}

/// Handles kept by the test after the connection is boxed away.
#[derive(Clone, Default)]
pub(crate) struct Script {
    executed: Arc<Mutex<Vec<String>>>,
    closes: Arc<Mutex<usize>>,
}

impl Script {
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

impl ScriptedConnection {
    pub fn new(responses: Vec<Vec<Row>>) -> (Self, Script) {
        let script = Script::default();
        let conn = Self {
            responses: responses.into(),
            executed: script.executed.clone(),
            closes: script.closes.clone(),
            closed: false,
        };
        (conn, script)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn dialect(&self) -> &str {
        "scripted"
    }

    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>> {
        if self.closed {
            return Err(SearchError::closed("scripted"));
        }
        self.executed.lock().unwrap().push(sql.clone());
        let rows = self
            .responses
            .pop_front()
            .ok_or_else(|| SearchError::query("scripted", format!("unexpected statement: {}", sql)))?;
        Ok(stream::iter(rows.into_iter().map(Ok)).boxed())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            *self.closes.lock().unwrap() += 1;
        }
        Ok(())
    }
}

/// Row with the given column names and cells.
pub(crate) fn row(columns: &[&str], values: &[Option<&str>]) -> Row {
    Row::new(
        columns.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        values.iter().map(|v| v.map(str::to_string)).collect(),
    )
}
