//! Core scraper trait and error types.

use thiserror::Error;

use crate::metric::ObservationSink;
use crate::scraper::{ScrapeContext, ServerVersion};
use crate::source::{DataSource, SourceError};

/// Errors that terminate one scraper's collection cycle.
///
/// None of these are retried here; the caller decides whether to log, count
/// or skip the scraper next cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    /// The query could not be issued or executed.
    #[error("query failed: {0}")]
    Query(String),

    /// A fetched row did not match the expected shape (1-based row number).
    #[error("failed to decode row {row}: {reason}")]
    Decode { row: usize, reason: String },

    /// The context was cancelled or its deadline elapsed.
    #[error("scrape cancelled")]
    Cancelled,

    /// The observation sink's receiver was dropped.
    #[error("observation sink closed")]
    SinkClosed,
}

impl ScrapeError {
    /// Attach a source error to the row being fetched.
    pub(crate) fn from_source(err: SourceError, row: usize) -> Self {
        match err {
            SourceError::Query(message) => Self::Query(message),
            SourceError::Decode(reason) => Self::Decode { row, reason },
        }
    }

    /// Check if the failure was caused by cancellation or timeout.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Core scraper trait.
///
/// A scraper queries one diagnostic view and pushes observations into the
/// caller's sink. Scrapers hold no state between invocations; every call to
/// [`scrape`](Scraper::scrape) starts fresh.
///
/// # Behavior
///
/// 1. Issue the scraper's fixed query through the data source
/// 2. Decode each row, map it to observations, push them in descriptor order
/// 3. Move to the next row only after every observation of the current row is pushed
///
/// # Returns
///
/// - `Ok(())`: Row sequence exhausted without error
/// - `Err(ScrapeError::Query)`: Query could not be issued; nothing was pushed
/// - `Err(ScrapeError::Decode)`: A row failed to decode; earlier rows remain pushed
/// - `Err(ScrapeError::Cancelled)`: Context cancelled while blocked; nothing further pushed
/// - `Err(ScrapeError::SinkClosed)`: Receiver dropped mid-cycle
#[async_trait::async_trait]
pub trait Scraper: Send + Sync + 'static {
    /// Stable, unique identifier (e.g., `sys.user_summary_by_statement_type`).
    fn name(&self) -> &'static str;

    /// Describes the role of the scraper.
    fn help(&self) -> &'static str;

    /// Oldest server version providing the scraped view.
    fn version(&self) -> ServerVersion;

    /// Run one collection cycle.
    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        source: &dyn DataSource,
        sink: &ObservationSink,
    ) -> Result<(), ScrapeError>;
}
