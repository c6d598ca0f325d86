//! Variable-arity table identity.
//!
//! Engines name tables with one to three components: SQLite knows only the
//! table, Oracle and PostgreSQL qualify with a schema, MySQL qualifies with a
//! database, and SQL Server (or PostgreSQL in cross-database mode) uses all
//! three. [`TableIdentity`] models that as a sum type so callers never have to
//! carry "maybe null" components around.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Which of the four naming shapes an identity uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Table,
    SchemaTable,
    DatabaseTable,
    DatabaseSchemaTable,
}

impl IdentityKind {
    /// Number of name components for this kind.
    pub fn arity(self) -> usize {
        match self {
            IdentityKind::Table => 1,
            IdentityKind::SchemaTable | IdentityKind::DatabaseTable => 2,
            IdentityKind::DatabaseSchemaTable => 3,
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentityKind::Table => "table",
            IdentityKind::SchemaTable => "schema.table",
            IdentityKind::DatabaseTable => "database.table",
            IdentityKind::DatabaseSchemaTable => "database.schema.table",
        };
        f.write_str(name)
    }
}

/// Fully qualified name of one base table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableIdentity {
    Table {
        table: String,
    },
    SchemaTable {
        schema: String,
        table: String,
    },
    DatabaseTable {
        database: String,
        table: String,
    },
    DatabaseSchemaTable {
        database: String,
        schema: String,
        table: String,
    },
}

impl TableIdentity {
    pub fn new_table(table: impl Into<String>) -> Self {
        TableIdentity::Table {
            table: table.into(),
        }
    }

    pub fn new_schema_table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        TableIdentity::SchemaTable {
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn new_database_table(database: impl Into<String>, table: impl Into<String>) -> Self {
        TableIdentity::DatabaseTable {
            database: database.into(),
            table: table.into(),
        }
    }

    pub fn new_database_schema_table(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        TableIdentity::DatabaseSchemaTable {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Build an identity of `kind` from its components, outermost first.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidArgument` when the number of components
    /// does not match the kind.
    pub fn from_components<I, S>(kind: IdentityKind, components: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts: Vec<String> = components.into_iter().map(Into::into).collect();
        if parts.len() != kind.arity() {
            return Err(SearchError::InvalidArgument(format!(
                "{} identity needs {} name component(s), got {}",
                kind,
                kind.arity(),
                parts.len()
            )));
        }

        // Arity is checked above, so each pop yields a component.
        let mut next = || parts.pop().unwrap_or_default();
        Ok(match kind {
            IdentityKind::Table => TableIdentity::Table { table: next() },
            IdentityKind::SchemaTable => {
                let table = next();
                TableIdentity::SchemaTable {
                    schema: next(),
                    table,
                }
            }
            IdentityKind::DatabaseTable => {
                let table = next();
                TableIdentity::DatabaseTable {
                    database: next(),
                    table,
                }
            }
            IdentityKind::DatabaseSchemaTable => {
                let table = next();
                let schema = next();
                TableIdentity::DatabaseSchemaTable {
                    database: next(),
                    schema,
                    table,
                }
            }
        })
    }

    pub fn kind(&self) -> IdentityKind {
        match self {
            TableIdentity::Table { .. } => IdentityKind::Table,
            TableIdentity::SchemaTable { .. } => IdentityKind::SchemaTable,
            TableIdentity::DatabaseTable { .. } => IdentityKind::DatabaseTable,
            TableIdentity::DatabaseSchemaTable { .. } => IdentityKind::DatabaseSchemaTable,
        }
    }

    pub fn database(&self) -> Option<&str> {
        match self {
            TableIdentity::DatabaseTable { database, .. }
            | TableIdentity::DatabaseSchemaTable { database, .. } => Some(database),
            TableIdentity::Table { .. } | TableIdentity::SchemaTable { .. } => None,
        }
    }

    pub fn schema(&self) -> Option<&str> {
        match self {
            TableIdentity::SchemaTable { schema, .. }
            | TableIdentity::DatabaseSchemaTable { schema, .. } => Some(schema),
            TableIdentity::Table { .. } | TableIdentity::DatabaseTable { .. } => None,
        }
    }

    /// Table component. Present for every variant; kept optional so all
    /// three accessors read the same way at call sites.
    pub fn table(&self) -> Option<&str> {
        Some(self.table_name())
    }

    pub fn table_name(&self) -> &str {
        match self {
            TableIdentity::Table { table }
            | TableIdentity::SchemaTable { table, .. }
            | TableIdentity::DatabaseTable { table, .. }
            | TableIdentity::DatabaseSchemaTable { table, .. } => table,
        }
    }

    /// Components outermost first.
    pub fn components(&self) -> Vec<&str> {
        match self {
            TableIdentity::Table { table } => vec![table],
            TableIdentity::SchemaTable { schema, table } => vec![schema, table],
            TableIdentity::DatabaseTable { database, table } => vec![database, table],
            TableIdentity::DatabaseSchemaTable {
                database,
                schema,
                table,
            } => vec![database, schema, table],
        }
    }

    /// Database component, or `InvalidArgument` naming the dialect that needs it.
    pub fn require_database(&self, dialect: &str) -> Result<&str> {
        self.database().ok_or_else(|| missing("database", dialect, self))
    }

    /// Schema component, or `InvalidArgument` naming the dialect that needs it.
    pub fn require_schema(&self, dialect: &str) -> Result<&str> {
        self.schema().ok_or_else(|| missing("schema", dialect, self))
    }
}

fn missing(component: &str, dialect: &str, identity: &TableIdentity) -> SearchError {
    SearchError::InvalidArgument(format!(
        "{} must be present for {} tables (got {} identity '{}')",
        component,
        dialect,
        identity.kind(),
        identity
    ))
}

impl Ord for TableIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        // Slice ordering on &str is ordinal per component, and a strict prefix
        // sorts first. The kind breaks ties between equal-looking identities
        // of different shape (schema.table vs database.table).
        self.components()
            .cmp(&other.components())
            .then_with(|| self.kind().cmp(&other.kind()))
    }
}

impl PartialOrd for TableIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.components().join("."))
    }
}
