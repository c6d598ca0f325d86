//! # dbsearch
//!
//! Schema introspection and substring search across relational engines.
//!
//! Given a dialect name, a connection string and a substring, the library
//! lists every table visible to the connection, classifies each table's
//! columns into primary-key and textual columns, and streams every
//! (row, textual column) pair whose value contains the substring.
//!
//! Supported engines: MySQL/MariaDB, Oracle (ODBC), PostgreSQL, SQLite and
//! SQL Server.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbsearch::{DialectCatalog, Orchestrator};
//! use dbsearch::config::DriverOptions;
//!
//! #[tokio::main]
//! async fn main() -> dbsearch::Result<()> {
//!     let catalog = DialectCatalog::with_builtins(&DriverOptions::default());
//!     let mut orchestrator = Orchestrator::connect(&catalog, "sqlite", "people.db").await?;
//!     let summary = orchestrator
//!         .run("love", |table, m| println!("{}: {}", table, m.matching_value))
//!         .await?;
//!     orchestrator.close().await?;
//!     println!("{} matches", summary.matches);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;

pub use crate::config::Config;
pub use crate::core::{
    DialectAdapter, DialectCatalog, IdentityKind, TableDefinition, TableIdentity, TextMatch,
};
pub use crate::error::{Result, SearchError};
pub use crate::orchestrator::{Description, Orchestrator, SearchSummary};
