//! Database driver implementations.
//!
//! Each driver module provides:
//!
//! - a `Dialect`: the catalog and search SQL for its engine, always compiled
//! - a wire client implementing `Connection`, behind the driver's feature
//! - a `ConnectionFactory` registered by `DialectCatalog::with_builtins`
//!
//! | Module | Registered name | Feature | Wire crate |
//! |--------|-----------------|---------|------------|
//! | [`mysql`] | `mysql` | `mysql` | sqlx |
//! | [`oracle`] | `oracle` | `oracle` | odbc-api |
//! | [`postgres`] | `postgresql` | `postgres` | tokio-postgres |
//! | [`sqlite`] | `sqlite` | `sqlite` | sqlx |
//! | [`mssql`] | `sqlserver` | `mssql` | tiberius |
//!
//! # Adding New Databases
//!
//! 1. Create a module under `drivers/` with a `Dialect` implementation
//! 2. Implement `Connection` over the engine's client crate
//! 3. Wrap both in a `DialectSession` from a `ConnectionFactory`
//! 4. Register the factory in `DialectCatalog::with_builtins()`
//! 5. Gate the client with a feature flag in `Cargo.toml`

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{IdentityKind, TableIdentity};
    use crate::core::schema::TableDefinition;
    use crate::core::traits::Dialect;

    fn dialects() -> Vec<Box<dyn Dialect>> {
        vec![
            Box::new(MysqlDialect::new()),
            Box::new(OracleDialect::new()),
            Box::new(PostgresDialect::new()),
            Box::new(PostgresDialect::cross_database()),
            Box::new(SqliteDialect::new()),
            Box::new(MssqlDialect::new()),
        ]
    }

    fn identity_for(kind: IdentityKind) -> TableIdentity {
        match kind {
            IdentityKind::Table => TableIdentity::new_table("people"),
            IdentityKind::SchemaTable => TableIdentity::new_schema_table("app", "people"),
            IdentityKind::DatabaseTable => TableIdentity::new_database_table("crm", "people"),
            IdentityKind::DatabaseSchemaTable => {
                TableIdentity::new_database_schema_table("crm", "app", "people")
            }
        }
    }

    #[test]
    fn test_dialect_names() {
        let names: Vec<String> = dialects().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(
            names,
            ["mysql", "oracle", "postgresql", "postgresql", "sqlite", "sqlserver"]
        );
    }

    #[test]
    fn test_every_dialect_builds_search_for_its_own_identities() {
        for dialect in dialects() {
            let identity = identity_for(dialect.identity_kind());
            let def = TableDefinition::new(identity, ["id"], ["bio"]).unwrap();
            let sql = dialect.search_query(&def, "x").unwrap().unwrap();
            assert!(sql.starts_with("SELECT "), "{}: {}", dialect.name(), sql);
            assert!(sql.contains(" LIKE "), "{}: {}", dialect.name(), sql);
            assert!(sql.contains("people"), "{}: {}", dialect.name(), sql);
        }
    }

    #[test]
    fn test_every_dialect_skips_tables_without_text() {
        for dialect in dialects() {
            let identity = identity_for(dialect.identity_kind());
            let def = TableDefinition::new(identity, ["id"], Vec::<String>::new()).unwrap();
            assert!(dialect.search_query(&def, "x").unwrap().is_none(), "{}", dialect.name());
        }
    }
}
