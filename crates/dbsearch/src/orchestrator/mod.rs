//! Search orchestrator - walks every table of one connection.

use std::time::Instant;

use futures::stream::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::catalog::DialectCatalog;
use crate::core::identity::TableIdentity;
use crate::core::schema::{TableDefinition, TextMatch};
use crate::core::traits::DialectAdapter;
use crate::error::Result;

/// Search orchestrator.
///
/// Owns one adapter and runs the introspect-then-search loop over every
/// table it lists, one statement at a time.
pub struct Orchestrator {
    adapter: Box<dyn DialectAdapter>,
    continue_on_error: bool,
}

/// Result of a search run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Tables listed by the catalog.
    pub tables_total: usize,

    /// Tables a search statement ran against.
    pub tables_searched: usize,

    /// Tables skipped because they have no textual column.
    pub tables_without_text: usize,

    /// Matches delivered to the callback.
    pub matches: usize,

    /// Tables whose definition or search failed (only with `continue_on_error`).
    pub failed_tables: Vec<String>,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

/// Result of [`Orchestrator::describe`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Definitions of the tables that were read, in listing order.
    pub definitions: Vec<TableDefinition>,

    /// Tables whose definition failed (only with `continue_on_error`).
    pub failed_tables: Vec<String>,
}

enum TableOutcome {
    Searched(usize),
    NoText,
}

impl Orchestrator {
    /// Wrap an already open adapter.
    pub fn new(adapter: Box<dyn DialectAdapter>) -> Self {
        Self {
            adapter,
            continue_on_error: false,
        }
    }

    /// Open `connection_string` with the factory registered as `dialect`.
    ///
    /// # Errors
    ///
    /// `SearchError::UnregisteredDialect` for unknown names, otherwise the
    /// factory's connection error.
    pub async fn connect(catalog: &DialectCatalog, dialect: &str, connection_string: &str) -> Result<Self> {
        let adapter = catalog.open(dialect, connection_string).await?;
        Ok(Self::new(adapter))
    }

    /// Log and skip failing tables instead of aborting the run.
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    /// Name of the dialect driving this run.
    pub fn dialect(&self) -> &str {
        self.adapter.dialect()
    }

    /// Search every table for `substring`, handing each match to `on_match`
    /// as soon as it is read.
    pub async fn run<F>(&mut self, substring: &str, mut on_match: F) -> Result<SearchSummary>
    where
        F: FnMut(&TableIdentity, &TextMatch) + Send,
    {
        let start = Instant::now();
        info!(dialect = self.adapter.dialect(), "Listing tables");

        let tables = self.adapter.materialize_tables().await?;
        info!("Found {} tables to search", tables.len());

        let mut summary = SearchSummary {
            tables_total: tables.len(),
            ..Default::default()
        };

        for identity in &tables {
            match self.search_table(identity, substring, &mut on_match).await {
                Ok(TableOutcome::Searched(found)) => {
                    summary.tables_searched += 1;
                    summary.matches += found;
                }
                Ok(TableOutcome::NoText) => summary.tables_without_text += 1,
                Err(e) if self.continue_on_error => {
                    warn!("{}: skipped after error: {}", identity, e);
                    summary.failed_tables.push(identity.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        summary.duration_seconds = start.elapsed().as_secs_f64();
        info!(
            "Search complete: {} matches in {} of {} tables ({:.2}s)",
            summary.matches, summary.tables_searched, summary.tables_total, summary.duration_seconds
        );
        Ok(summary)
    }

    async fn search_table<F>(
        &mut self,
        identity: &TableIdentity,
        substring: &str,
        on_match: &mut F,
    ) -> Result<TableOutcome>
    where
        F: FnMut(&TableIdentity, &TextMatch) + Send,
    {
        let definition = self.adapter.table_definition(identity).await?;
        if !definition.has_text_columns() {
            debug!("{}: no text columns", identity);
            return Ok(TableOutcome::NoText);
        }

        let mut found = 0;
        let mut matches = self.adapter.substring_matches(&definition, substring)?;
        while let Some(m) = matches.try_next().await? {
            on_match(identity, &m);
            found += 1;
        }
        debug!("{}: {} matches", identity, found);
        Ok(TableOutcome::Searched(found))
    }

    /// Definitions of every table, without searching.
    pub async fn describe(&mut self) -> Result<Description> {
        let tables = self.adapter.materialize_tables().await?;
        let mut description = Description {
            definitions: Vec::with_capacity(tables.len()),
            failed_tables: Vec::new(),
        };
        for identity in &tables {
            match self.adapter.table_definition(identity).await {
                Ok(definition) => description.definitions.push(definition),
                Err(e) if self.continue_on_error => {
                    warn!("{}: skipped after error: {}", identity, e);
                    description.failed_tables.push(identity.to_string());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(description)
    }

    /// Close the underlying connection. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        self.adapter.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::quote_double;
    use crate::core::identity::IdentityKind;
    use crate::core::row::Row;
    use crate::core::session::DialectSession;
    use crate::core::testing::{row, Script, ScriptedConnection};
    use crate::core::traits::Dialect;
    use crate::error::SearchError;

    struct FlatDialect;

    impl Dialect for FlatDialect {
        fn name(&self) -> &str {
            "flat"
        }

        fn identity_kind(&self) -> IdentityKind {
            IdentityKind::Table
        }

        fn quote_ident(&self, name: &str) -> String {
            quote_double(name)
        }

        fn is_text_type(&self, type_name: &str) -> bool {
            type_name == "TEXT"
        }

        fn tables_query(&self, _database: Option<&str>) -> String {
            "TABLES".to_string()
        }

        fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
            Ok(format!("COLUMNS {}", identity))
        }

        fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
            Ok(quote_double(identity.table_name()))
        }
    }

    const COLS: [&str; 3] = ["name", "type", "pk"];

    fn table(name: &str) -> Row {
        row(&["name"], &[Some(name)])
    }

    fn column(name: &str, type_name: &str, pk: bool) -> Row {
        row(&COLS, &[Some(name), Some(type_name), Some(if pk { "1" } else { "0" })])
    }

    fn orchestrator(responses: Vec<Vec<Row>>) -> (Orchestrator, Script) {
        let (conn, script) = ScriptedConnection::new(responses);
        let adapter = DialectSession::new(FlatDialect, Box::new(conn));
        (Orchestrator::new(Box::new(adapter)), script)
    }

    #[tokio::test]
    async fn test_run_searches_each_table() {
        let (mut orch, script) = orchestrator(vec![
            vec![table("nums"), table("people")],
            vec![column("n", "INTEGER", true)],
            vec![column("id", "INTEGER", true), column("bio", "TEXT", false)],
            vec![
                row(&["bio", "id"], &[Some("loves gears"), Some("1")]),
                row(&["bio", "id"], &[Some("hates love"), Some("2")]),
            ],
        ]);

        let mut seen = Vec::new();
        let summary = orch
            .run("love", |identity, m| {
                seen.push((identity.to_string(), m.primary_key_display()))
            })
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec![
                ("people".to_string(), "id=1".to_string()),
                ("people".to_string(), "id=2".to_string()),
            ]
        );
        assert_eq!(summary.tables_total, 2);
        assert_eq!(summary.tables_searched, 1);
        assert_eq!(summary.tables_without_text, 1);
        assert_eq!(summary.matches, 2);
        assert!(summary.failed_tables.is_empty());
        // nums never gets a search statement
        assert_eq!(script.executed().len(), 4);
    }

    #[tokio::test]
    async fn test_run_stops_on_first_failure() {
        let (mut orch, _script) = orchestrator(vec![vec![table("a"), table("b")]]);
        let err = orch.run("x", |_, _| {}).await.unwrap_err();
        assert!(matches!(err, SearchError::Query { .. }));
    }

    #[tokio::test]
    async fn test_run_continue_on_error_records_failures() {
        let (orch, _script) = orchestrator(vec![
            vec![table("a"), table("b")],
            vec![column("id", "INTEGER", true), column("t", "TEXT", false)],
            vec![row(&["id", "t"], &[None, Some("xx")])],
            vec![column("id", "INTEGER", true), column("t", "TEXT", false)],
            vec![row(&["id", "t"], &[Some("7"), Some("xx")])],
        ]);
        let mut orch = orch.continue_on_error(true);

        let mut count = 0;
        let summary = orch.run("x", |_, _| count += 1).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(summary.failed_tables, vec!["a".to_string()]);
        assert_eq!(summary.tables_searched, 1);
        assert_eq!(summary.matches, 1);
    }

    #[tokio::test]
    async fn test_describe_returns_definitions() {
        let (mut orch, _script) = orchestrator(vec![
            vec![table("people")],
            vec![column("id", "INTEGER", true), column("bio", "TEXT", false)],
        ]);
        let description = orch.describe().await.unwrap();
        assert_eq!(
            description.definitions,
            vec![TableDefinition::new(TableIdentity::new_table("people"), ["id"], ["bio"]).unwrap()]
        );
        assert!(description.failed_tables.is_empty());
    }

    #[tokio::test]
    async fn test_describe_stops_on_first_failure() {
        let (mut orch, _script) = orchestrator(vec![
            vec![table("people"), table("broken")],
            vec![column("id", "INTEGER", true), column("bio", "TEXT", false)],
        ]);
        let err = orch.describe().await.unwrap_err();
        assert!(matches!(err, SearchError::Query { .. }));
    }

    #[tokio::test]
    async fn test_describe_continue_on_error_records_failures() {
        // "broken" gets no catalog response, so its definition fails.
        let (orch, _script) = orchestrator(vec![
            vec![table("people"), table("broken")],
            vec![column("id", "INTEGER", true), column("bio", "TEXT", false)],
        ]);
        let mut orch = orch.continue_on_error(true);

        let description = orch.describe().await.unwrap();
        assert_eq!(description.definitions.len(), 1);
        assert_eq!(description.definitions[0].identity().to_string(), "people");
        assert_eq!(description.failed_tables, vec!["broken".to_string()]);
    }

    #[tokio::test]
    async fn test_connect_unregistered_dialect() {
        let catalog = DialectCatalog::new();
        let err = Orchestrator::connect(&catalog, "db2", "x").await.err().unwrap();
        assert!(matches!(err, SearchError::UnregisteredDialect(_)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut orch, script) = orchestrator(vec![]);
        orch.close().await.unwrap();
        orch.close().await.unwrap();
        assert_eq!(script.close_count(), 1);
    }
}
