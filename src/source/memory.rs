//! Scripted in-memory data source.
//!
//! Replays a fixed result set for every query. Used by tests and by dry runs
//! that exercise scrapers without a live server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::source::{DataSource, SourceError, SqlRow};

/// Decrements the open cursor count when the row stream is dropped.
struct CursorGuard(Arc<AtomicUsize>);

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory [`DataSource`] with scripted rows and failures.
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: Vec<SqlRow>,
    query_error: Option<String>,
    row_error: Option<(usize, String)>,
    stall: bool,
    queries: Mutex<Vec<String>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Create a source that returns `rows` for every query.
    pub fn new(rows: Vec<SqlRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Fail every query before any row is produced.
    pub fn with_query_error(mut self, message: impl Into<String>) -> Self {
        self.query_error = Some(message.into());
        self
    }

    /// Fail with a decode error in place of the row at `index` (0-based).
    pub fn with_decode_error_at(mut self, index: usize, message: impl Into<String>) -> Self {
        self.row_error = Some((index, message.into()));
        self
    }

    /// Never complete after the scripted items; the next fetch blocks forever.
    pub fn with_stall(mut self) -> Self {
        self.stall = true;
        self
    }

    /// SQL statements issued so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of row streams currently alive.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn scripted_items(&self) -> Vec<Result<SqlRow, SourceError>> {
        if let Some(message) = &self.query_error {
            return vec![Err(SourceError::Query(message.clone()))];
        }

        let mut items = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            match &self.row_error {
                Some((fail_at, message)) if *fail_at == index => {
                    items.push(Err(SourceError::Decode(message.clone())));
                    return items;
                }
                _ => items.push(Ok(row.clone())),
            }
        }
        items
    }
}

impl DataSource for MemorySource {
    fn query<'a>(&'a self, sql: &'a str) -> BoxStream<'a, Result<SqlRow, SourceError>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sql.to_string());

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let guard = CursorGuard(Arc::clone(&self.open_cursors));

        let items = stream::iter(self.scripted_items());
        let rows = if self.stall {
            items.chain(stream::pending()).boxed()
        } else {
            items.boxed()
        };

        rows.map(move |item| {
            let _cursor = &guard;
            item
        })
        .boxed()
    }
}
