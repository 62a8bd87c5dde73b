//! Bounded observation channel.

use tokio::sync::mpsc;

use crate::metric::Observation;
use crate::scraper::{ScrapeContext, ScrapeError};

/// Create a bounded observation channel.
///
/// Capacity is clamped to a minimum of 1.
pub fn channel(capacity: usize) -> (ObservationSink, mpsc::Receiver<Observation>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ObservationSink { tx }, rx)
}

/// Producer side of the observation channel.
///
/// Pushing waits while the channel is full, but never past cancellation of
/// the supplied context.
#[derive(Debug, Clone)]
pub struct ObservationSink {
    tx: mpsc::Sender<Observation>,
}

impl ObservationSink {
    /// Push one observation, waiting for capacity.
    ///
    /// # Errors
    /// - `ScrapeError::Cancelled` if the context is cancelled or past its deadline
    /// - `ScrapeError::SinkClosed` if the receiver has been dropped
    pub async fn push(&self, ctx: &ScrapeContext, obs: Observation) -> Result<(), ScrapeError> {
        ctx.run(self.tx.send(obs))
            .await?
            .map_err(|_| ScrapeError::SinkClosed)
    }

    /// Check if the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
