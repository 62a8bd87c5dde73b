//! Query executor.
//!
//! Issues a fixed, parameterless query and decodes each fetched row into a
//! typed struct. Rows are fetched lazily, one per [`RowStream::try_next`] call;
//! the underlying cursor is released as soon as the stream is exhausted,
//! fails, or is dropped.

use std::marker::PhantomData;

use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::scraper::{ScrapeContext, ScrapeError};
use crate::source::{DataSource, SourceError, SqlRow};

/// Typed decoding of one fetched row, bound to the query that produces it.
pub trait FromSqlRow: Sized {
    /// Read-only statement projecting exactly [`COLUMNS`](FromSqlRow::COLUMNS)
    /// columns in decode order.
    const QUERY: &'static str;

    /// Exact number of projected columns.
    const COLUMNS: usize;

    /// Decode a row already checked to have [`COLUMNS`](FromSqlRow::COLUMNS) values.
    ///
    /// # Errors
    /// Returns a description of the first column that does not match.
    fn from_sql_row(row: &SqlRow) -> Result<Self, String>;
}

/// Issue `R::QUERY` against `source` and return a lazy stream of decoded rows.
///
/// Awaits the first fetch so that a query which cannot be issued fails here,
/// before any row is handed out.
///
/// # Errors
/// - `ScrapeError::Query` if the query cannot be issued
/// - `ScrapeError::Decode` if the first row cannot be read
/// - `ScrapeError::Cancelled` if the context finishes while waiting
pub async fn execute<'a, R: FromSqlRow>(
    ctx: &'a ScrapeContext,
    source: &'a dyn DataSource,
) -> Result<RowStream<'a, R>, ScrapeError> {
    let mut rows = source.query(R::QUERY);
    let peeked = match ctx.run(rows.next()).await? {
        Some(Ok(row)) => Some(row),
        Some(Err(err)) => return Err(ScrapeError::from_source(err, 1)),
        None => None,
    };

    let mut stream = RowStream {
        ctx,
        rows,
        finished: peeked.is_none(),
        peeked,
        fetched: 0,
        _marker: PhantomData,
    };
    if stream.finished {
        stream.release();
    }
    Ok(stream)
}

/// Finite, single-pass sequence of decoded rows.
pub struct RowStream<'a, R> {
    ctx: &'a ScrapeContext,
    rows: BoxStream<'a, Result<SqlRow, SourceError>>,
    peeked: Option<SqlRow>,
    fetched: usize,
    finished: bool,
    _marker: PhantomData<fn() -> R>,
}

impl<R> std::fmt::Debug for RowStream<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("fetched", &self.fetched)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<R: FromSqlRow> RowStream<'_, R> {
    /// Fetch and decode the next row.
    ///
    /// Returns `Ok(None)` once the rows are exhausted. After any error the
    /// stream is finished and further calls return `Ok(None)`.
    pub async fn try_next(&mut self) -> Result<Option<R>, ScrapeError> {
        let raw = match self.peeked.take() {
            Some(row) => row,
            None if self.finished => return Ok(None),
            None => match self.ctx.run(self.rows.next()).await {
                Ok(Some(Ok(row))) => row,
                Ok(Some(Err(err))) => {
                    return Err(self.fail(ScrapeError::from_source(err, self.fetched + 1)));
                }
                Ok(None) => {
                    self.finished = true;
                    self.release();
                    return Ok(None);
                }
                Err(err) => return Err(self.fail(err)),
            },
        };

        self.fetched += 1;
        if raw.len() != R::COLUMNS {
            let reason = format!("expected {} columns, got {}", R::COLUMNS, raw.len());
            return Err(self.fail(ScrapeError::Decode {
                row: self.fetched,
                reason,
            }));
        }

        match R::from_sql_row(&raw) {
            Ok(row) => Ok(Some(row)),
            Err(reason) => Err(self.fail(ScrapeError::Decode {
                row: self.fetched,
                reason,
            })),
        }
    }
}

impl<R> RowStream<'_, R> {
    /// Rows fetched so far, including one that failed to decode.
    pub fn rows_fetched(&self) -> usize {
        self.fetched
    }

    pub fn is_finished(&self) -> bool {
        self.finished && self.peeked.is_none()
    }

    fn fail(&mut self, err: ScrapeError) -> ScrapeError {
        self.finished = true;
        self.peeked = None;
        self.release();
        err
    }

    /// Drop the underlying cursor without waiting for the stream itself to drop.
    fn release(&mut self) {
        self.rows = stream::empty().boxed();
    }
}
