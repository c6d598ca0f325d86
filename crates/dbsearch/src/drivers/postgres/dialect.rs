//! PostgreSQL SQL dialect (Strategy pattern).
//!
//! By default tables are named `schema.table` within the connected database.
//! In cross-database mode every database in `pg_database` is listed and
//! tables are named `database.schema.table`, with catalog references prefixed
//! by the database name. PostgreSQL itself only resolves such references for
//! the current database, so the mode is off unless configured.

use crate::core::identifier::{qualify, quote_double};
use crate::core::identity::{IdentityKind, TableIdentity};
use crate::core::traits::Dialect;
use crate::error::Result;

/// Column types searched in PostgreSQL, compared against `pg_type.typname`.
const TEXT_TYPES: &[&str] = &["char", "varchar", "text"];

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect {
    cross_database: bool,
}

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance for the current database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dialect listing every database of the cluster.
    pub fn cross_database() -> Self {
        Self {
            cross_database: true,
        }
    }

    pub fn is_cross_database(&self) -> bool {
        self.cross_database
    }

    /// `pg_catalog`, prefixed by the database in cross-database mode.
    fn catalog(&self, database: Option<&str>) -> String {
        match database {
            Some(db) if self.cross_database => format!("{}.pg_catalog", self.quote_ident(db)),
            _ => "pg_catalog".to_string(),
        }
    }

    fn database_of<'a>(&self, identity: &'a TableIdentity) -> Result<Option<&'a str>> {
        if self.cross_database {
            identity.require_database(self.name()).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn identity_kind(&self) -> IdentityKind {
        if self.cross_database {
            IdentityKind::DatabaseSchemaTable
        } else {
            IdentityKind::SchemaTable
        }
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn is_text_type(&self, type_name: &str) -> bool {
        TEXT_TYPES.contains(&type_name)
    }

    fn databases_query(&self) -> Option<String> {
        self.cross_database
            .then(|| "SELECT datname FROM pg_catalog.pg_database ORDER BY datname".to_string())
    }

    fn tables_query(&self, database: Option<&str>) -> String {
        let catalog = self.catalog(database);
        format!(
            "SELECT n.nspname, c.relname \
             FROM {catalog}.pg_class c \
             JOIN {catalog}.pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relkind IN ('r', 'p') \
               AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
             ORDER BY n.nspname, c.relname"
        )
    }

    fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
        let schema = identity.require_schema(self.name())?;
        let catalog = self.catalog(self.database_of(identity)?);
        Ok(format!(
            "SELECT a.attname, t.typname, \
                    CASE WHEN i.indexrelid IS NULL THEN 0 ELSE 1 END AS is_primary_key \
             FROM {catalog}.pg_class c \
             JOIN {catalog}.pg_namespace n ON n.oid = c.relnamespace \
             JOIN {catalog}.pg_attribute a ON a.attrelid = c.oid \
             JOIN {catalog}.pg_type t ON t.oid = a.atttypid \
             LEFT JOIN {catalog}.pg_index i \
               ON i.indrelid = c.oid AND i.indisprimary AND a.attnum = ANY(i.indkey) \
             WHERE n.nspname = {schema} AND c.relname = {table} \
               AND a.attnum > 0 AND NOT a.attisdropped \
             ORDER BY a.attnum",
            schema = self.quote_literal(schema),
            table = self.quote_literal(identity.table_name()),
        ))
    }

    fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
        let schema = identity.require_schema(self.name())?;
        let mut parts = Vec::with_capacity(3);
        if let Some(db) = self.database_of(identity)? {
            parts.push(self.quote_ident(db));
        }
        parts.push(self.quote_ident(schema));
        parts.push(self.quote_ident(identity.table_name()));
        Ok(qualify(&parts))
    }
}
