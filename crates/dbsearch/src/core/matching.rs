//! Match streaming protocol shared by every dialect.
//!
//! The search statement's `LIKE` filter narrows rows on the server, but engines
//! disagree on case sensitivity and collation. Each returned row is therefore
//! re-checked client side with an ordinal, case-sensitive `contains`, and only
//! cells passing that check become [`TextMatch`]es.

use std::collections::BTreeMap;

use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{Result, SearchError};

use super::row::Row;
use super::schema::{TableDefinition, TextMatch};
use super::traits::{Connection, MatchStream};

/// Execute `query` on first poll and stream the matches it produces.
///
/// Every primary-key and textual column of `definition` must be present in
/// the query's result set.
pub fn stream_matches<'a>(
    conn: &'a mut dyn Connection,
    definition: &'a TableDefinition,
    query: String,
    substring: &'a str,
) -> MatchStream<'a> {
    debug!(
        dialect = conn.dialect(),
        table = %definition.identity(),
        "searching with: {}",
        query
    );

    stream::once(conn.execute(query))
        .try_flatten()
        .and_then(move |row| future::ready(row_matches(&row, definition, substring)))
        .map_ok(|found| stream::iter(found.into_iter().map(Ok::<_, SearchError>)))
        .try_flatten()
        .boxed()
}

/// Matches contained in one result row, in text-column order.
///
/// # Errors
///
/// `SearchError::InvalidState` when a primary-key value is NULL.
pub fn row_matches(row: &Row, definition: &TableDefinition, substring: &str) -> Result<Vec<TextMatch>> {
    let mut primary_key = BTreeMap::new();
    for column in definition.primary_key_columns() {
        let value = row.get_opt(column)?.ok_or_else(|| {
            SearchError::InvalidState(format!(
                "primary key column '{}' of {} is NULL",
                column,
                definition.identity()
            ))
        })?;
        primary_key.insert(column.clone(), value.to_owned());
    }

    let mut found = Vec::new();
    for column in definition.text_columns() {
        let Some(value) = row.get_opt(column)? else {
            continue;
        };
        if value.contains(substring) {
            found.push(TextMatch {
                row_primary_key: primary_key.clone(),
                matching_column: column.clone(),
                matching_value: value.to_owned(),
            });
        }
    }
    Ok(found)
}
