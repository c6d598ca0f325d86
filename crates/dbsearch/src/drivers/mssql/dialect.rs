//! SQL Server SQL dialect (Strategy pattern).
//!
//! SQL Server exposes every database of the instance through three-part
//! names, so tables are listed per database from `sys.databases` and named
//! `database.schema.table`.

use crate::core::identifier::{escape_string_literal, quote_bracket};
use crate::core::identity::{IdentityKind, TableIdentity};
use crate::core::traits::Dialect;
use crate::error::Result;

/// SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new SQL Server dialect instance.
    pub fn new() -> Self {
        Self
    }

    /// `[db].sys`, or `sys` for the current database.
    fn sys(&self, database: Option<&str>) -> String {
        match database {
            Some(db) => format!("{}.sys", self.quote_ident(db)),
            None => "sys".to_string(),
        }
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "sqlserver"
    }

    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::DatabaseSchemaTable
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_bracket(name)
    }

    /// Unicode literal, so non-ASCII search terms survive the comparison
    /// against `nvarchar` columns.
    fn quote_literal(&self, value: &str) -> String {
        format!("N'{}'", escape_string_literal(value))
    }

    fn is_text_type(&self, type_name: &str) -> bool {
        type_name.ends_with("char") || type_name.ends_with("text")
    }

    fn databases_query(&self) -> Option<String> {
        Some("SELECT name FROM sys.databases ORDER BY name".to_string())
    }

    fn tables_query(&self, database: Option<&str>) -> String {
        let sys = self.sys(database);
        format!(
            "SELECT s.name, o.name \
             FROM {sys}.objects o \
             JOIN {sys}.schemas s ON s.schema_id = o.schema_id \
             WHERE o.type = 'U' \
             ORDER BY s.name, o.name"
        )
    }

    fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
        let database = identity.require_database(self.name())?;
        let schema = identity.require_schema(self.name())?;
        let sys = self.sys(Some(database));
        Ok(format!(
            "SELECT c.name, t.name, \
                    CASE WHEN pk.column_id IS NULL THEN 0 ELSE 1 END AS is_primary_key \
             FROM {sys}.objects o \
             JOIN {sys}.schemas s ON s.schema_id = o.schema_id \
             JOIN {sys}.columns c ON c.object_id = o.object_id \
             JOIN {sys}.types t ON t.user_type_id = c.user_type_id \
             LEFT JOIN ( \
                 SELECT ic.object_id, ic.column_id \
                 FROM {sys}.indexes i \
                 JOIN {sys}.index_columns ic \
                   ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
                 WHERE i.is_primary_key = 1 \
             ) pk ON pk.object_id = c.object_id AND pk.column_id = c.column_id \
             WHERE o.type = 'U' AND s.name = {schema} AND o.name = {table} \
             ORDER BY c.column_id",
            schema = self.quote_literal(schema),
            table = self.quote_literal(identity.table_name()),
        ))
    }

    fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
        let database = identity.require_database(self.name())?;
        let schema = identity.require_schema(self.name())?;
        Ok(format!(
            "{}.{}.{}",
            self.quote_ident(database),
            self.quote_ident(schema),
            self.quote_ident(identity.table_name())
        ))
    }

    /// Every selected column comes back as `nvarchar` text under its own name.
    fn select_expr(&self, column: &str) -> String {
        let quoted = self.quote_ident(column);
        format!("CAST({} AS NVARCHAR(MAX)) AS {}", quoted, quoted)
    }
}
