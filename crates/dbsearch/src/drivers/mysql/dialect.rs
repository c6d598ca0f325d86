//! MySQL/MariaDB SQL dialect (Strategy pattern).
//!
//! Tables are named `database.table`: MySQL's "schemas" are databases, and
//! `INFORMATION_SCHEMA` reports them in `TABLE_SCHEMA`.

use crate::core::identifier::{escape_string_literal, quote_backtick};
use crate::core::identity::{IdentityKind, TableIdentity};
use crate::core::traits::Dialect;
use crate::error::Result;

/// MySQL/MariaDB dialect implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::DatabaseTable
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_backtick(name)
    }

    fn quote_literal(&self, value: &str) -> String {
        // Backslash is an escape character inside MySQL string literals
        // unless NO_BACKSLASH_ESCAPES is set.
        format!("'{}'", escape_string_literal(&value.replace('\\', "\\\\")))
    }

    fn is_text_type(&self, type_name: &str) -> bool {
        type_name.ends_with("char") || type_name.ends_with("text")
    }

    fn tables_query(&self, _database: Option<&str>) -> String {
        "SELECT TABLE_SCHEMA, TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
         WHERE TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_SCHEMA, TABLE_NAME"
            .to_string()
    }

    fn columns_query(&self, identity: &TableIdentity) -> Result<String> {
        let database = identity.require_database(self.name())?;
        Ok(format!(
            "SELECT C.COLUMN_NAME, C.DATA_TYPE, \
                    CASE WHEN K.COLUMN_NAME IS NULL THEN 0 ELSE 1 END AS IS_PRIMARY_KEY \
             FROM INFORMATION_SCHEMA.COLUMNS C \
             LEFT JOIN ( \
                 SELECT KCU.TABLE_SCHEMA, KCU.TABLE_NAME, KCU.COLUMN_NAME \
                 FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS TC \
                 JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE KCU \
                   ON KCU.CONSTRAINT_CATALOG = TC.CONSTRAINT_CATALOG \
                  AND KCU.CONSTRAINT_SCHEMA = TC.CONSTRAINT_SCHEMA \
                  AND KCU.CONSTRAINT_NAME = TC.CONSTRAINT_NAME \
                  AND KCU.TABLE_NAME = TC.TABLE_NAME \
                 WHERE TC.CONSTRAINT_TYPE = 'PRIMARY KEY' \
             ) K ON K.TABLE_SCHEMA = C.TABLE_SCHEMA \
                AND K.TABLE_NAME = C.TABLE_NAME \
                AND K.COLUMN_NAME = C.COLUMN_NAME \
             WHERE C.TABLE_SCHEMA = {} AND C.TABLE_NAME = {} \
             ORDER BY C.ORDINAL_POSITION",
            self.quote_literal(database),
            self.quote_literal(identity.table_name())
        ))
    }

    fn qualified_name(&self, identity: &TableIdentity) -> Result<String> {
        let database = identity.require_database(self.name())?;
        Ok(format!(
            "{}.{}",
            self.quote_ident(database),
            self.quote_ident(identity.table_name())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::TableDefinition;
    use crate::error::SearchError;

    #[test]
    fn test_mysql_quote_ident() {
        let d = MysqlDialect::new();
        assert_eq!(d.quote_ident("users"), "`users`");
        assert_eq!(d.quote_ident("table`name"), "`table``name`");
        assert_eq!(d.quote_ident("O'Brien's \"Table\""), "`O'Brien's \"Table\"`");
    }

    #[test]
    fn test_mysql_literal_escapes_backslash_and_quote() {
        let d = MysqlDialect::new();
        assert_eq!(d.quote_literal("it's"), "'it''s'");
        assert_eq!(d.quote_literal("a\\b"), "'a\\\\b'");
        assert_eq!(d.quote_literal("\\"), "'\\\\'");
    }

    #[test]
    fn test_mysql_text_types() {
        let d = MysqlDialect::new();
        for t in ["char", "varchar", "text", "tinytext", "mediumtext", "longtext"] {
            assert!(d.is_text_type(t), "{} should be text", t);
        }
        for t in ["int", "blob", "datetime", "json", "VARCHAR", "enum"] {
            assert!(!d.is_text_type(t), "{} should not be text", t);
        }
    }

    #[test]
    fn test_mysql_columns_query_filters_on_literals() {
        let d = MysqlDialect::new();
        let sql = d
            .columns_query(&TableIdentity::new_database_table("shop", "o'rders"))
            .unwrap();
        assert!(sql.contains("C.TABLE_SCHEMA = 'shop' AND C.TABLE_NAME = 'o''rders'"));
        assert!(sql.contains("TC.CONSTRAINT_TYPE = 'PRIMARY KEY'"));
        assert!(sql.ends_with("ORDER BY C.ORDINAL_POSITION"));
    }

    #[test]
    fn test_mysql_requires_database() {
        let d = MysqlDialect::new();
        let bare = TableIdentity::new_table("orders");
        assert!(matches!(
            d.columns_query(&bare),
            Err(SearchError::InvalidArgument(_))
        ));
        let def = TableDefinition::new(bare, ["id"], Vec::<String>::new()).unwrap();
        assert!(matches!(
            d.search_query(&def, "x"),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mysql_search_query() {
        let d = MysqlDialect::new();
        let def = TableDefinition::new(
            TableIdentity::new_database_table("shop", "customers"),
            ["id"],
            ["email", "name"],
        )
        .unwrap();
        let sql = d.search_query(&def, "50%_o'k\\").unwrap().unwrap();
        assert_eq!(
            sql,
            "SELECT `email`, `id`, `name` FROM `shop`.`customers` WHERE \
             `email` LIKE '%50\\\\%\\\\_o''k\\\\\\\\%' ESCAPE '\\\\' OR \
             `name` LIKE '%50\\\\%\\\\_o''k\\\\\\\\%' ESCAPE '\\\\'"
        );
    }

    #[test]
    fn test_mysql_tables_query() {
        let sql = MysqlDialect::new().tables_query(None);
        assert!(sql.starts_with("SELECT TABLE_SCHEMA, TABLE_NAME FROM INFORMATION_SCHEMA.TABLES"));
        assert!(sql.contains("TABLE_TYPE = 'BASE TABLE'"));
    }
}
