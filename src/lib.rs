//! mysqld-sys-scraper - MySQL `sys` schema scrapers
//!
//! Converts the contents of database diagnostic views into typed, labelled
//! metric observations for a monitoring backend. Observations are raw
//! point-in-time values; rates and aggregation belong to the time-series
//! store.
//!
//! # Architecture
//!
//! - **Metric**: Static descriptor tables, observations, bounded sink, text exposition
//! - **Source**: Read-only data source handle (sqlx MySQL pool or in-memory rows)
//! - **Scraper**: Uniform scrape contract, query executor, registry
//! - **Config**: YAML configuration for the `sys-scrape` binary
//!
//! # Example
//!
//! ```rust
//! use mysqld_sys_scraper::metric::{self, render_text};
//! use mysqld_sys_scraper::scraper::{ScrapeContext, ScraperRegistry};
//! use mysqld_sys_scraper::source::{MemorySource, SqlRow, SqlValue};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut values = vec![SqlValue::from("app"), SqlValue::from("select")];
//! values.extend([10u64, 500, 50, 5, 100, 200, 0, 1].map(SqlValue::UInt));
//! let source = MemorySource::new(vec![SqlRow::new(values)]);
//!
//! let (sink, mut rx) = metric::channel(64);
//! let outcomes = ScraperRegistry::builtin()
//!     .collect_once(&ScrapeContext::new(), &source, &sink)
//!     .await;
//! drop(sink);
//! assert!(outcomes.iter().all(|o| o.result.is_ok()));
//!
//! let mut observations = Vec::new();
//! while let Some(obs) = rx.recv().await {
//!     observations.push(obs);
//! }
//! let text = render_text(&observations).unwrap();
//! assert!(text.contains(r#"mysql_sys_user_total_statements{user="app",statement="select"} 10"#));
//! # }
//! ```

pub mod config;
pub mod metric;
pub mod scraper;
pub mod source;

pub use metric::{MetricDescriptor, Observation, ObservationSink, ValueType};
pub use scraper::{ScrapeContext, ScrapeError, Scraper, ScraperRegistry, ServerVersion};
pub use source::{DataSource, MemorySource, MySqlSource, SourceError};
