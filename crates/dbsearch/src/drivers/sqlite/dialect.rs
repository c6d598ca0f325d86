//! SQLite SQL dialect (Strategy pattern).
//!
//! A SQLite connection sees one database file, so tables are named by table
//! name alone.

use crate::core::identifier::quote_double;
use crate::core::identity::{IdentityKind, TableIdentity};
use crate::core::row::Row;
use crate::core::schema::CatalogColumn;
use crate::core::traits::Dialect;
use crate::error::Result;

/// SQLite dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Create a new SQLite dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::Table
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    /// Column affinity rules: anything containing `INT` is integer, then
    /// `CHAR`, `CLOB` or `TEXT` means text.
    fn is_text_type(&self, type_name: &str) -> bool {
        let upper = type_name.to_uppercase();
        if upper.contains("INT") {
            return false;
        }
        upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT")
    }

    fn tables_query(&self, _database: Option<&str>) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name".to_string()
    }

    fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
        Ok(format!(
            "PRAGMA table_info({})",
            self.quote_literal(identity.table_name())
        ))
    }

    /// `PRAGMA table_info` rows: `cid, name, type, notnull, dflt_value, pk`,
    /// where `pk` is the 1-based position in the primary key or 0.
    fn catalog_column(&self, row: &Row) -> Result<CatalogColumn> {
        Ok(CatalogColumn {
            name: row.get_string("name")?.to_owned(),
            type_name: row.get_opt("type")?.unwrap_or_default().to_owned(),
            is_primary_key: row.get_flag("pk")?,
        })
    }

    fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
        Ok(self.quote_ident(identity.table_name()))
    }
}
