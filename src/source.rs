//! Data Source Layer
//!
//! The read-only handle scrapers query. A source issues one SQL statement and
//! yields a lazy, single-pass stream of decoded rows; the stream owns the
//! underlying cursor and releases it when dropped.
//!
//! # Components
//!
//! - [`DataSource`]: Trait implemented by every queryable backend
//! - [`SqlRow`] / [`SqlValue`]: Driver-neutral column values
//! - [`MySqlSource`]: sqlx MySQL connection pool
//! - [`MemorySource`]: Scripted in-memory rows for tests and dry runs

mod memory;
mod mysql;
mod value;

use futures::stream::BoxStream;
use thiserror::Error;

pub use memory::MemorySource;
pub use mysql::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_CONNECTIONS, MySqlSource};
pub use value::{SqlRow, SqlValue};

/// Errors surfaced by a data source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The query could not be issued or executed.
    #[error("query error: {0}")]
    Query(String),

    /// A fetched row could not be converted into column values.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only, shareable handle to a database.
///
/// Implementations must not hold resources beyond the lifetime of the stream
/// returned by [`query`](DataSource::query).
pub trait DataSource: Send + Sync {
    /// Issue `sql` and stream its rows.
    ///
    /// Query failures are reported as the first stream item.
    fn query<'a>(&'a self, sql: &'a str) -> BoxStream<'a, Result<SqlRow, SourceError>>;
}
