//! Oracle SQL dialect (Strategy pattern).
//!
//! Tables are named `owner.table` from `ALL_TABLES`, which covers every table
//! the connected user can see.

use crate::core::identifier::quote_double;
use crate::core::identity::{IdentityKind, TableIdentity};
use crate::core::traits::Dialect;
use crate::error::Result;

/// Column types searched in Oracle. Compared exactly, as `ALL_TAB_COLUMNS`
/// reports them.
const TEXT_TYPES: &[&str] = &["CHAR", "CLOB", "VARCHAR", "VARCHAR2"];

/// Oracle dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Create a new Oracle dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::SchemaTable
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_double(name)
    }

    fn is_text_type(&self, type_name: &str) -> bool {
        TEXT_TYPES.contains(&type_name)
    }

    fn tables_query(&self, _database: Option<&str>) -> String {
        "SELECT OWNER, TABLE_NAME FROM ALL_TABLES ORDER BY OWNER, TABLE_NAME".to_string()
    }

    fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
        let owner = identity.require_schema(self.name())?;
        Ok(format!(
            "SELECT ATC.COLUMN_NAME, ATC.DATA_TYPE, \
                    CASE WHEN PK.COLUMN_NAME IS NULL THEN 0 ELSE 1 END AS IS_PRIMKEY \
             FROM ALL_TAB_COLUMNS ATC \
             LEFT JOIN ( \
                 SELECT ACC.OWNER, ACC.TABLE_NAME, ACC.COLUMN_NAME \
                 FROM ALL_CONSTRAINTS AC \
                 JOIN ALL_CONS_COLUMNS ACC \
                   ON ACC.OWNER = AC.OWNER \
                  AND ACC.CONSTRAINT_NAME = AC.CONSTRAINT_NAME \
                  AND ACC.TABLE_NAME = AC.TABLE_NAME \
                 WHERE AC.CONSTRAINT_TYPE = 'P' \
             ) PK ON PK.OWNER = ATC.OWNER \
                 AND PK.TABLE_NAME = ATC.TABLE_NAME \
                 AND PK.COLUMN_NAME = ATC.COLUMN_NAME \
             WHERE ATC.OWNER = {} AND ATC.TABLE_NAME = {} \
             ORDER BY ATC.COLUMN_ID",
            self.quote_literal(owner),
            self.quote_literal(identity.table_name())
        ))
    }

    fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
        let owner = identity.require_schema(self.name())?;
        Ok(format!(
            "{}.{}",
            self.quote_ident(owner),
            self.quote_ident(identity.table_name())
        ))
    }

    /// Every selected column comes back as `VARCHAR2(4000)` text under its own name.
    fn select_expr(&self, column: &str) -> String {
        let quoted = self.quote_ident(column);
        format!("CAST({} AS VARCHAR2(4000)) {}", quoted, quoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::TableDefinition;
    use crate::error::SearchError;

    #[test]
    fn test_oracle_text_types_exact() {
        let d = OracleDialect::new();
        for t in TEXT_TYPES {
            assert!(d.is_text_type(t));
        }
        for t in ["NVARCHAR2", "NCHAR", "NUMBER", "DATE", "varchar2", "BLOB"] {
            assert!(!d.is_text_type(t), "{} should not be text", t);
        }
    }

    #[test]
    fn test_oracle_columns_query() {
        let d = OracleDialect::new();
        let sql = d
            .columns_query(&TableIdentity::new_schema_table("HR", "EMPLOYEES"))
            .unwrap();
        assert!(sql.contains("FROM ALL_TAB_COLUMNS ATC"));
        assert!(sql.contains("AC.CONSTRAINT_TYPE = 'P'"));
        assert!(sql.contains("ATC.OWNER = 'HR' AND ATC.TABLE_NAME = 'EMPLOYEES'"));
    }

    #[test]
    fn test_oracle_requires_owner() {
        let d = OracleDialect::new();
        let err = d
            .columns_query(&TableIdentity::new_table("EMPLOYEES"))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_oracle_search_query_casts_select_list() {
        let d = OracleDialect::new();
        let def = TableDefinition::new(
            TableIdentity::new_schema_table("HR", "EMP"),
            ["EMP_ID"],
            ["NOTES"],
        )
        .unwrap();
        let sql = d.search_query(&def, "it's").unwrap().unwrap();
        assert_eq!(
            sql,
            "SELECT CAST(\"EMP_ID\" AS VARCHAR2(4000)) \"EMP_ID\", \
             CAST(\"NOTES\" AS VARCHAR2(4000)) \"NOTES\" \
             FROM \"HR\".\"EMP\" WHERE \"NOTES\" LIKE '%it''s%' ESCAPE '\\'"
        );
    }
}
