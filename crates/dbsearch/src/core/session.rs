//! Generic [`DialectAdapter`] over a [`Dialect`] strategy and a [`Connection`].

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::error::{Result, SearchError};

use super::identity::TableIdentity;
use super::matching::stream_matches;
use super::schema::{CatalogColumn, TableDefinition};
use super::traits::{Connection, Dialect, DialectAdapter, IdentityStream, MatchStream};

/// One open connection driven by one dialect.
pub struct DialectSession<D> {
    dialect: D,
    conn: Box<dyn Connection>,
}

impl<D: Dialect> DialectSession<D> {
    pub fn new(dialect: D, conn: Box<dyn Connection>) -> Self {
        Self { dialect, conn }
    }
}

#[async_trait]
impl<D: Dialect + 'static> DialectAdapter for DialectSession<D> {
    fn dialect(&self) -> &str {
        self.dialect.name()
    }

    async fn list_tables<'a>(&'a mut self) -> Result<IdentityStream<'a>> {
        let dialect = &self.dialect;

        let Some(databases_sql) = dialect.databases_query() else {
            let sql = dialect.tables_query(None);
            debug!(dialect = dialect.name(), "listing tables: {}", sql);
            let rows = self.conn.execute(sql).await?;
            return Ok(rows
                .and_then(move |row| future::ready(dialect.table_identity(None, &row)))
                .boxed());
        };

        debug!(dialect = dialect.name(), "listing databases: {}", databases_sql);
        let databases: Vec<String> = self
            .conn
            .execute(databases_sql)
            .await?
            .and_then(|row| future::ready(row.get_string(0).map(str::to_owned)))
            .try_collect()
            .await?;
        debug!(dialect = dialect.name(), "found {} databases", databases.len());

        Ok(per_database_tables(dialect, self.conn.as_mut(), databases))
    }

    async fn table_definition(&mut self, identity: &TableIdentity) -> Result<TableDefinition> {
        let dialect = &self.dialect;
        let sql = dialect.columns_query(identity)?;
        debug!(dialect = dialect.name(), table = %identity, "reading columns: {}", sql);

        let columns: Vec<CatalogColumn> = self
            .conn
            .execute(sql)
            .await?
            .and_then(|row| future::ready(dialect.catalog_column(&row)))
            .try_collect()
            .await?;

        if columns.is_empty() {
            warn!(dialect = dialect.name(), table = %identity, "catalog returned no columns");
        }

        let primary_key = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone());
        let text = columns
            .iter()
            .filter(|c| dialect.is_text_type(&c.type_name))
            .map(|c| c.name.clone());
        let definition = TableDefinition::new(identity.clone(), primary_key, text)?;

        debug!(
            table = %identity,
            primary_key = ?definition.primary_key_columns(),
            text = ?definition.text_columns(),
            "table definition"
        );
        Ok(definition)
    }

    fn substring_matches<'a>(
        &'a mut self,
        definition: &'a TableDefinition,
        substring: &'a str,
    ) -> Result<MatchStream<'a>> {
        match self.dialect.search_query(definition, substring)? {
            Some(sql) => Ok(stream_matches(self.conn.as_mut(), definition, sql, substring)),
            None => {
                debug!(table = %definition.identity(), "no text columns, skipping");
                Ok(stream::empty().boxed())
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.conn.close().await
    }
}

/// Lists tables one database at a time: each step runs the per-database
/// listing query to completion and yields its identities.
fn per_database_tables<'a, D: Dialect>(
    dialect: &'a D,
    conn: &'a mut dyn Connection,
    databases: Vec<String>,
) -> IdentityStream<'a> {
    stream::unfold(Some((conn, databases.into_iter())), move |state| async move {
        let Some((conn, mut databases)) = state else {
            return None;
        };
        let Some(database) = databases.next() else {
            return None;
        };

        let sql = dialect.tables_query(Some(&database));
        debug!(dialect = dialect.name(), database = %database, "listing tables: {}", sql);
        let batch: Result<Vec<TableIdentity>> = match conn.execute(sql).await {
            Ok(rows) => {
                rows.and_then(|row| future::ready(dialect.table_identity(Some(&database), &row)))
                    .try_collect()
                    .await
            }
            Err(e) => Err(e),
        };

        match batch {
            Ok(tables) => Some((Ok(tables), Some((conn, databases)))),
            Err(e) => Some((Err(e), None)),
        }
    })
    .map_ok(|tables| stream::iter(tables.into_iter().map(Ok::<_, SearchError>)))
    .try_flatten()
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::{quote_double, quote_string};
    use crate::core::identity::IdentityKind;
    use crate::core::row::Row;
    use crate::core::testing::{row, Script, ScriptedConnection};

    /// Minimal dialect: `[database.]table` identities, SQLite-like catalog.
    struct TestDialect {
        per_database: bool,
    }

    impl Dialect for TestDialect {
        fn name(&self) -> &str {
            "test"
        }

        fn identity_kind(&self) -> IdentityKind {
            if self.per_database {
                IdentityKind::DatabaseTable
            } else {
                IdentityKind::Table
            }
        }

        fn quote_ident(&self, name: &str) -> String {
            quote_double(name)
        }

        fn is_text_type(&self, type_name: &str) -> bool {
            type_name == "TEXT"
        }

        fn databases_query(&self) -> Option<String> {
            self.per_database.then(|| "SHOW DATABASES".to_string())
        }

        fn tables_query(&self, database: Option<&str>) -> String {
            match database {
                Some(db) => format!("TABLES IN {}", quote_double(db)),
                None => "TABLES".to_string(),
            }
        }

        fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
            Ok(format!("COLUMNS {}", quote_string(identity.table_name())))
        }

        fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
            Ok(identity
                .components()
                .into_iter()
                .map(quote_double)
                .collect::<Vec<_>>()
                .join("."))
        }
    }

    fn session(per_database: bool, responses: Vec<Vec<Row>>) -> (DialectSession<TestDialect>, Script) {
        let (conn, script) = ScriptedConnection::new(responses);
        (
            DialectSession::new(TestDialect { per_database }, Box::new(conn)),
            script,
        )
    }

    #[tokio::test]
    async fn test_list_tables_single_query() {
        let (mut s, script) = session(
            false,
            vec![vec![row(&["name"], &[Some("a")]), row(&["name"], &[Some("b")])]],
        );
        let tables = s.materialize_tables().await.unwrap();
        assert_eq!(
            tables,
            vec![TableIdentity::new_table("a"), TableIdentity::new_table("b")]
        );
        assert_eq!(script.executed(), vec!["TABLES"]);
    }

    #[tokio::test]
    async fn test_list_tables_per_database() {
        let (mut s, script) = session(
            true,
            vec![
                vec![row(&["name"], &[Some("one")]), row(&["name"], &[Some("two")])],
                vec![row(&["t"], &[Some("x")])],
                vec![],
            ],
        );
        let tables = s.materialize_tables().await.unwrap();
        assert_eq!(tables, vec![TableIdentity::new_database_table("one", "x")]);
        assert_eq!(
            script.executed(),
            vec!["SHOW DATABASES", "TABLES IN \"one\"", "TABLES IN \"two\""]
        );
    }

    #[tokio::test]
    async fn test_list_tables_is_lazy_per_database() {
        let (mut s, script) = session(
            true,
            vec![
                vec![row(&["name"], &[Some("one")]), row(&["name"], &[Some("two")])],
                vec![row(&["t"], &[Some("x")])],
                vec![row(&["t"], &[Some("y")])],
            ],
        );
        let mut tables = s.list_tables().await.unwrap();
        let first = tables.try_next().await.unwrap();
        assert_eq!(first, Some(TableIdentity::new_database_table("one", "x")));
        drop(tables);
        assert_eq!(script.executed().len(), 2);
    }

    #[tokio::test]
    async fn test_list_tables_null_component_is_invalid_argument() {
        let (mut s, _script) = session(false, vec![vec![row(&["name"], &[None])]]);
        let err = s.materialize_tables().await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_table_definition_classifies_columns() {
        let cols = ["name", "type", "pk"];
        let (mut s, _script) = session(
            false,
            vec![vec![
                row(&cols, &[Some("id"), Some("INTEGER"), Some("1")]),
                row(&cols, &[Some("name"), Some("TEXT"), Some("0")]),
                row(&cols, &[Some("bio"), Some("TEXT"), Some("0")]),
                row(&cols, &[Some("blob"), None, Some("0")]),
            ]],
        );
        let people = TableIdentity::new_table("people");
        let def = s.table_definition(&people).await.unwrap();
        assert_eq!(
            def,
            TableDefinition::new(people, ["id"], ["bio", "name"]).unwrap()
        );
    }

    #[tokio::test]
    async fn test_substring_matches_without_text_columns_issues_no_query() {
        let (mut s, script) = session(false, vec![]);
        let def = TableDefinition::new(TableIdentity::new_table("nums"), ["id"], Vec::<String>::new())
            .unwrap();
        let matches: Vec<_> = s
            .substring_matches(&def, "x")
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(matches.is_empty());
        assert!(script.executed().is_empty());
    }

    #[tokio::test]
    async fn test_substring_matches_runs_search_query() {
        let cols = ["bio", "id", "name"];
        let (mut s, script) = session(
            false,
            vec![vec![row(&cols, &[Some("loves gears"), Some("1"), Some("Ada")])]],
        );
        let def = TableDefinition::new(TableIdentity::new_table("people"), ["id"], ["bio", "name"])
            .unwrap();
        let matches: Vec<_> = s
            .substring_matches(&def, "love")
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matching_column, "bio");
        assert_eq!(
            script.executed(),
            vec![
                "SELECT \"bio\", \"id\", \"name\" FROM \"people\" WHERE \
                 \"bio\" LIKE '%love%' ESCAPE '\\' OR \"name\" LIKE '%love%' ESCAPE '\\'"
            ]
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_further_queries() {
        let (mut s, script) = session(false, vec![vec![]]);
        s.close().await.unwrap();
        s.close().await.unwrap();
        assert_eq!(script.close_count(), 1);
        let err = s.materialize_tables().await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidState(_)));
    }
}
