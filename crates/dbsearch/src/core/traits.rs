//! Core traits for cross-engine introspection and search.
//!
//! - [`Connection`]: the wire collaborator. Executes SQL text and yields text rows.
//! - [`Dialect`]: SQL syntax strategy for one engine family. Pure, no I/O.
//! - [`DialectAdapter`]: the three operations callers use (list tables,
//!   describe a table, stream substring matches) plus disposal.
//! - [`ConnectionFactory`]: opens an adapter from a connection string; the
//!   unit registered in the [`DialectCatalog`](super::catalog::DialectCatalog).
//!
//! # Design Patterns
//!
//! - **Strategy**: each engine is a `Dialect`; one generic session runs them all
//! - **Template Method**: `Dialect::search_query` and friends are provided
//!   methods that engines override piecewise
//! - **Abstract Factory**: `ConnectionFactory` hides which driver backs a dialect

use async_trait::async_trait;
use futures::stream::{BoxStream, TryStreamExt};

use crate::error::{Result, SearchError};

use super::identifier::{escape_like_pattern, quote_string, LIKE_ESCAPE};
use super::identity::{IdentityKind, TableIdentity};
use super::row::Row;
use super::schema::{CatalogColumn, TableDefinition, TextMatch};

/// Forward-only stream of result rows for one statement.
pub type RowStream<'a> = BoxStream<'a, Result<Row>>;

/// Forward-only stream of table identities.
pub type IdentityStream<'a> = BoxStream<'a, Result<TableIdentity>>;

/// Forward-only stream of substring matches.
pub type MatchStream<'a> = BoxStream<'a, Result<TextMatch>>;

/// One open database connection.
///
/// Single in-flight statement: the returned stream borrows the connection, so
/// the borrow checker enforces that a result set is finished (or dropped)
/// before the next statement is issued.
#[async_trait]
pub trait Connection: Send {
    /// Dialect name, used in error messages and logs.
    fn dialect(&self) -> &str;

    /// Execute `sql` and stream its rows.
    ///
    /// # Errors
    ///
    /// `SearchError::Query` when the statement fails, `SearchError::InvalidState`
    /// after [`close`](Self::close).
    async fn execute<'a>(&'a mut self, sql: String) -> Result<RowStream<'a>>;

    /// Release the connection. Idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// SQL strategy for one engine family.
///
/// Required methods describe what genuinely differs between engines (catalog
/// queries, quoting, the textual-type rule). Provided methods assemble those
/// pieces into complete statements and may be overridden where an engine
/// needs something special.
pub trait Dialect: Send + Sync {
    /// Registry name ("mysql", "postgresql", ...).
    fn name(&self) -> &str;

    /// Shape of the identities this dialect produces and accepts.
    fn identity_kind(&self) -> IdentityKind;

    /// Quote an identifier (table, column, schema name).
    fn quote_ident(&self, name: &str) -> String;

    /// Quote a string literal.
    fn quote_literal(&self, value: &str) -> String {
        quote_string(value)
    }

    /// Escape character for LIKE patterns.
    fn like_escape(&self) -> char {
        LIKE_ESCAPE
    }

    /// Whether a catalog type name denotes a searchable textual column.
    fn is_text_type(&self, type_name: &str) -> bool;

    /// Query returning one database name per row, for engines that list
    /// tables one database at a time. `None` when a single query lists
    /// every table.
    fn databases_query(&self) -> Option<String> {
        None
    }

    /// Query listing base tables, in `database` when `databases_query` is used.
    /// Rows carry the remaining name components, outermost first.
    fn tables_query(&self, database: Option<&str>) -> String;

    /// Build an identity from a listing row.
    fn table_identity(&self, database: Option<&str>, row: &Row) -> Result<TableIdentity> {
        let mut components: Vec<String> = database.map(str::to_owned).into_iter().collect();
        for idx in 0..row.len() {
            match row.get_opt(idx)? {
                Some(value) => components.push(value.to_owned()),
                None => {
                    return Err(SearchError::InvalidArgument(format!(
                        "{} catalog returned a NULL name component (column {})",
                        self.name(),
                        idx
                    )))
                }
            }
        }
        TableIdentity::from_components(self.identity_kind(), components)
    }

    /// Column catalog query for one table. Rows yield name, type name and a
    /// primary-key flag (see [`catalog_column`](Self::catalog_column)).
    fn columns_query(&self, identity: &TableIdentity) -> Result<String>;

    /// Decode one row of [`columns_query`](Self::columns_query).
    fn catalog_column(&self, row: &Row) -> Result<CatalogColumn> {
        Ok(CatalogColumn {
            name: row.get_string(0)?.to_owned(),
            type_name: row.get_opt(1)?.unwrap_or_default().to_owned(),
            is_primary_key: row.get_flag(2)?,
        })
    }

    /// Fully quoted name used in `FROM`.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidArgument` when a component this dialect needs is missing.
    fn qualified_name(&self, identity: &TableIdentity) -> Result<String>;

    /// Select-list expression for one column.
    fn select_expr(&self, column: &str) -> String {
        self.quote_ident(column)
    }

    /// `<col> LIKE '%<escaped>%' ESCAPE '<esc>'`.
    fn like_predicate(&self, column: &str, substring: &str) -> String {
        let escape = self.like_escape();
        let pattern = format!("%{}%", escape_like_pattern(substring, escape));
        format!(
            "{} LIKE {} ESCAPE {}",
            self.quote_ident(column),
            self.quote_literal(&pattern),
            self.quote_literal(&escape.to_string())
        )
    }

    /// Search statement for `definition`, or `None` when the table has no
    /// textual column (nothing to search, no query issued).
    ///
    /// The identity is validated first, so a malformed identity fails even
    /// for tables without textual columns.
    fn search_query(&self, definition: &TableDefinition, substring: &str) -> Result<Option<String>> {
        let from = self.qualified_name(definition.identity())?;
        if !definition.has_text_columns() {
            return Ok(None);
        }

        let select = definition
            .search_columns()
            .into_iter()
            .map(|c| self.select_expr(c))
            .collect::<Vec<_>>()
            .join(", ");
        let predicate = definition
            .text_columns()
            .iter()
            .map(|c| self.like_predicate(c, substring))
            .collect::<Vec<_>>()
            .join(" OR ");

        Ok(Some(format!(
            "SELECT {} FROM {} WHERE {}",
            select, from, predicate
        )))
    }
}

/// Introspection and search over one open connection.
///
/// Lifecycle: an adapter is open from construction until [`close`](Self::close)
/// (or drop). Operations after close fail with `SearchError::InvalidState`.
#[async_trait]
pub trait DialectAdapter: Send {
    /// Dialect name.
    fn dialect(&self) -> &str;

    /// Stream every base table visible through the connection.
    ///
    /// The stream holds the connection. Drain it (see
    /// [`materialize_tables`](Self::materialize_tables)) before issuing other
    /// operations.
    async fn list_tables<'a>(&'a mut self) -> Result<IdentityStream<'a>>;

    /// Primary-key and textual columns of one table.
    async fn table_definition(&mut self, identity: &TableIdentity) -> Result<TableDefinition>;

    /// Stream every (row, textual column) whose value contains `substring`.
    ///
    /// The statement runs on first poll. Tables without textual columns yield
    /// an empty stream and never touch the connection.
    fn substring_matches<'a>(
        &'a mut self,
        definition: &'a TableDefinition,
        substring: &'a str,
    ) -> Result<MatchStream<'a>>;

    /// Release the connection. Idempotent.
    async fn close(&mut self) -> Result<()>;

    /// Drain [`list_tables`](Self::list_tables) into a vector.
    async fn materialize_tables(&mut self) -> Result<Vec<TableIdentity>> {
        let tables = self.list_tables().await?;
        tables.try_collect().await
    }
}

/// Opens adapters for one dialect.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Dialect name this factory serves.
    fn dialect(&self) -> &str;

    /// Open a connection and wrap it in an adapter.
    ///
    /// # Errors
    ///
    /// `SearchError::Connection` when the connection cannot be established.
    async fn open(&self, connection_string: &str) -> Result<Box<dyn DialectAdapter>>;
}
