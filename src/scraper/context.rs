//! Cancellable execution context.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::scraper::ScrapeError;

/// Cancellation and deadline shared by every suspension point of a scrape.
///
/// Cloning shares the underlying token; cancelling any clone cancels all.
#[derive(Debug, Clone, Default)]
pub struct ScrapeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScrapeContext {
    /// Create a context with a fresh token and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a deadline `timeout` from now, keeping any earlier deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline, keeping any earlier deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Signal cancellation to every holder of this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolve once the context is cancelled or its deadline elapses.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    ///
    /// Cancellation wins ties, so an already-cancelled context never polls `fut`.
    ///
    /// # Errors
    /// Returns `ScrapeError::Cancelled` if the context is cancelled or times out.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ScrapeError> {
        tokio::select! {
            biased;
            _ = self.done() => Err(ScrapeError::Cancelled),
            out = fut => Ok(out),
        }
    }
}
