// SQLite store for imported transfer records
// Records are written once per source file and only read afterwards

mod db;
mod error;
mod filter;
mod pool;
mod queries;
mod schema;

// Public API
pub use db::{Database, DatabaseOptions, InsertOutcome};
pub use error::{Error, Result};
pub use filter::{FilterConditions, QueryPlan, SqlValue, build_conditions, build_query};
pub use pool::{ConnectionPool, PooledConnection};
pub use schema::SCHEMA_VERSION;
