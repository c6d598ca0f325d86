//! Core abstractions for engine-agnostic schema search.
//!
//! - [`identity`]: table naming across the four catalog shapes
//! - [`identifier`]: identifier, literal and `LIKE` pattern escaping
//! - [`schema`]: table definitions and matches
//! - [`row`]: text rows returned by connections
//! - [`traits`]: the `Connection`, `Dialect`, `DialectAdapter` and
//!   `ConnectionFactory` seams
//! - [`session`]: the generic adapter pairing a dialect with a connection
//! - [`matching`]: the match streaming protocol
//! - [`catalog`]: dialect registry for dependency injection
//!
//! # Design Patterns
//!
//! - **Abstract Factory**: `DialectCatalog` opens adapters by dialect name
//! - **Strategy**: `Dialect` holds every per-engine SQL decision
//! - **Template Method**: provided `Dialect` methods build search statements
//!   from the per-engine hooks

pub mod catalog;
pub mod identifier;
pub mod identity;
pub mod matching;
pub mod row;
pub mod schema;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::DialectCatalog;
pub use identity::{IdentityKind, TableIdentity};
pub use matching::stream_matches;
pub use row::Row;
pub use schema::{CatalogColumn, TableDefinition, TextMatch};
pub use session::DialectSession;
pub use traits::{
    Connection, ConnectionFactory, Dialect, DialectAdapter, IdentityStream, MatchStream, RowStream,
};
