//! Scraper Layer
//!
//! Self-describing units that query one diagnostic view and emit metric
//! observations. The collection engine knows nothing about a scraper's schema;
//! it only drives the uniform [`Scraper`] contract.
//!
//! # Architecture
//!
//! - [`Scraper`]: Core trait for implementing scrapers
//! - [`ScrapeContext`]: Cancellation token and deadline shared by every suspension point
//! - [`execute`] / [`RowStream`]: Query executor decoding rows into typed structs
//! - [`ScraperRegistry`]: Explicit list of compiled-in scrapers
//!
//! # Example
//!
//! ```rust,no_run
//! use mysqld_sys_scraper::metric;
//! use mysqld_sys_scraper::scraper::{ScrapeContext, Scraper, SysUserSummaryByStatementType};
//! use mysqld_sys_scraper::source::MySqlSource;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = MySqlSource::connect("mysql://exporter@localhost:3306/").await?;
//! let (sink, mut rx) = metric::channel(64);
//! let ctx = ScrapeContext::new().with_timeout(Duration::from_secs(10));
//!
//! let drain = tokio::spawn(async move {
//!     let mut observations = Vec::new();
//!     while let Some(obs) = rx.recv().await {
//!         observations.push(obs);
//!     }
//!     observations
//! });
//! SysUserSummaryByStatementType.scrape(&ctx, &source, &sink).await?;
//! drop(sink);
//! print!("{}", metric::render_text(&drain.await?)?);
//! # Ok(())
//! # }
//! ```

mod context;
mod query;
mod registry;
pub mod sys;
mod traits;
mod version;

pub use context::ScrapeContext;
pub use query::{FromSqlRow, RowStream, execute};
pub use registry::{
    COLLECTOR_DURATION, COLLECTOR_SUCCESS, ScrapeOutcome, ScraperRegistry, UnknownScraper,
};
pub use sys::SysUserSummaryByStatementType;
pub use traits::{ScrapeError, Scraper};
pub use version::{ServerVersion, VersionParseError};
