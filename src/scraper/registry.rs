//! Scraper registry for enumerating and running compiled-in scrapers.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::metric::{MetricDescriptor, Observation, ObservationSink};
use crate::scraper::{
    ScrapeContext, ScrapeError, Scraper, ServerVersion, SysUserSummaryByStatementType,
};
use crate::source::DataSource;

/// Sub-namespace for metrics describing the scrapers themselves.
const EXPORTER_SUBSYSTEM: &str = "exporter";

const COLLECTOR_LABELS: &[&str] = &["collector"];

/// Budget for pushing one scraper's status gauges, independent of the cycle.
const STATUS_PUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Whether a scraper's last cycle succeeded (1) or failed (0).
pub static COLLECTOR_SUCCESS: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::gauge(
        EXPORTER_SUBSYSTEM,
        "collector_success",
        "mysqld_exporter: Whether a collector succeeded.",
        COLLECTOR_LABELS,
    )
});

/// Wall-clock duration of a scraper's last cycle.
pub static COLLECTOR_DURATION: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::gauge(
        EXPORTER_SUBSYSTEM,
        "collector_duration_seconds",
        "Collector time duration.",
        COLLECTOR_LABELS,
    )
});

/// Requested scraper name is not registered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown scraper {0:?}")]
pub struct UnknownScraper(pub String);

/// Result of one scraper's cycle within [`ScraperRegistry::collect_once`].
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// Scraper name.
    pub scraper: &'static str,
    /// Time spent in `scrape`.
    pub duration: Duration,
    /// Value returned by `scrape`.
    pub result: Result<(), ScrapeError>,
}

/// Explicit, ordered list of scrapers.
///
/// Registration is by name; a scraper whose name is already present is
/// ignored.
#[derive(Clone, Default)]
pub struct ScraperRegistry {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl std::fmt::Debug for ScraperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperRegistry")
            .field("scrapers", &self.names())
            .finish()
    }
}

impl ScraperRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every compiled-in scraper.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SysUserSummaryByStatementType));
        registry
    }

    /// Add a scraper. Returns `false` if its name is already registered.
    pub fn register(&mut self, scraper: Arc<dyn Scraper>) -> bool {
        if self.get(scraper.name()).is_some() {
            tracing::warn!(scraper = scraper.name(), "Scraper already registered");
            return false;
        }
        self.scrapers.push(scraper);
        true
    }

    /// Look up a scraper by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Scraper>> {
        self.scrapers.iter().find(|s| s.name() == name)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.scrapers.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scraper>> {
        self.scrapers.iter()
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }

    /// Keep only the named scrapers, in registration order. An empty
    /// selection keeps everything.
    ///
    /// # Errors
    /// Returns `UnknownScraper` for the first name that is not registered.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, UnknownScraper> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        if let Some(unknown) = names.iter().find(|n| self.get(n.as_ref()).is_none()) {
            return Err(UnknownScraper(unknown.as_ref().to_string()));
        }
        let scrapers = self
            .scrapers
            .iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == s.name()))
            .cloned()
            .collect();
        Ok(Self { scrapers })
    }

    /// Drop scrapers whose view is newer than `server`.
    pub fn supported_by(&self, server: ServerVersion) -> Self {
        let scrapers = self
            .scrapers
            .iter()
            .filter(|s| {
                let supported = s.version() <= server;
                if !supported {
                    tracing::info!(
                        scraper = s.name(),
                        required = %s.version(),
                        server = %server,
                        "Skipping scraper unsupported by server"
                    );
                }
                supported
            })
            .cloned()
            .collect();
        Self { scrapers }
    }

    /// Run every scraper once, sequentially.
    ///
    /// A failing scraper never stops its siblings. After each scraper, a
    /// success gauge and a duration gauge labelled with its name are pushed,
    /// even when `ctx` was cancelled or hit its deadline.
    pub async fn collect_once(
        &self,
        ctx: &ScrapeContext,
        source: &dyn DataSource,
        sink: &ObservationSink,
    ) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::with_capacity(self.scrapers.len());

        for scraper in &self.scrapers {
            let name = scraper.name();
            let start = Instant::now();
            tracing::debug!(scraper = name, "Running scrape");

            let result = scraper.scrape(ctx, source, sink).await;
            let duration = start.elapsed();

            match &result {
                Ok(()) => {
                    tracing::debug!(
                        scraper = name,
                        duration_ms = duration.as_millis(),
                        "Scrape succeeded"
                    );
                }
                Err(e) => {
                    tracing::error!(scraper = name, error = %e, "Scrape failed");
                }
            }

            // A cancelled or timed-out cycle still reports its failure, so the
            // gauges get their own short deadline instead of `ctx`.
            let status_ctx = ScrapeContext::new().with_timeout(STATUS_PUSH_TIMEOUT);
            let success = if result.is_ok() { 1.0 } else { 0.0 };
            for (desc, value) in [
                (&*COLLECTOR_SUCCESS, success),
                (&*COLLECTOR_DURATION, duration.as_secs_f64()),
            ] {
                let obs = Observation::from_parts(desc, value, vec![name.to_string()]);
                if let Err(e) = sink.push(&status_ctx, obs).await {
                    tracing::warn!(scraper = name, error = %e, "Failed to push collector status");
                }
            }

            outcomes.push(ScrapeOutcome {
                scraper: name,
                duration,
                result,
            });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{self, ValueType};
    use crate::source::{MemorySource, SqlRow, SqlValue};

    /// A scraper that always fails.
    struct FailingScraper;

    #[async_trait::async_trait]
    impl Scraper for FailingScraper {
        fn name(&self) -> &'static str {
            "test.failing"
        }

        fn help(&self) -> &'static str {
            "Always fails."
        }

        fn version(&self) -> ServerVersion {
            ServerVersion::new(8, 0, 0)
        }

        async fn scrape(
            &self,
            _ctx: &ScrapeContext,
            _source: &dyn DataSource,
            _sink: &ObservationSink,
        ) -> Result<(), ScrapeError> {
            Err(ScrapeError::Query("boom".into()))
        }
    }

    fn registry() -> ScraperRegistry {
        let mut registry = ScraperRegistry::new();
        registry.register(Arc::new(FailingScraper));
        registry.register(Arc::new(SysUserSummaryByStatementType));
        registry
    }

    fn sample_row() -> SqlRow {
        let mut values = vec![SqlValue::from("app"), SqlValue::from("select")];
        values.extend([1u64; 8].map(SqlValue::UInt));
        SqlRow::new(values)
    }

    #[test]
    fn test_builtin_lists_sys_scraper() {
        let registry = ScraperRegistry::builtin();
        assert_eq!(registry.names(), vec!["sys.user_summary_by_statement_type"]);
        assert!(registry.get("sys.user_summary_by_statement_type").is_some());
    }

    #[test]
    fn test_register_rejects_duplicate_names() {
        let mut registry = ScraperRegistry::builtin();
        assert!(!registry.register(Arc::new(SysUserSummaryByStatementType)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_select() {
        let registry = registry();
        let empty: [&str; 0] = [];
        assert_eq!(registry.select(&empty).unwrap().len(), 2);

        let selected = registry.select(&["sys.user_summary_by_statement_type"]).unwrap();
        assert_eq!(selected.names(), vec!["sys.user_summary_by_statement_type"]);

        let err = registry.select(&["sys.nope"]).unwrap_err();
        assert_eq!(err, UnknownScraper("sys.nope".into()));
    }

    #[test]
    fn test_supported_by_filters_on_version() {
        let registry = registry();
        let old = registry.supported_by(ServerVersion::new(5, 7, 44));
        assert_eq!(old.names(), vec!["sys.user_summary_by_statement_type"]);

        let new = registry.supported_by(ServerVersion::new(8, 0, 36));
        assert_eq!(new.len(), 2);

        assert!(registry.supported_by(ServerVersion::new(5, 6, 51)).is_empty());
    }

    #[test]
    fn test_status_descriptors_are_gauges() {
        assert_eq!(COLLECTOR_SUCCESS.fq_name(), "mysql_exporter_collector_success");
        assert_eq!(COLLECTOR_SUCCESS.value_type(), ValueType::Gauge);
        assert_eq!(
            COLLECTOR_DURATION.fq_name(),
            "mysql_exporter_collector_duration_seconds"
        );
    }

    #[tokio::test]
    async fn test_collect_once_isolates_failures() {
        let source = MemorySource::new(vec![sample_row()]);
        let (sink, mut rx) = metric::channel(64);
        let ctx = ScrapeContext::new();

        let outcomes = registry().collect_once(&ctx, &source, &sink).await;
        drop(sink);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].scraper, "test.failing");
        assert_eq!(outcomes[0].result, Err(ScrapeError::Query("boom".into())));
        assert_eq!(outcomes[1].result, Ok(()));

        let mut observations = Vec::new();
        while let Some(obs) = rx.recv().await {
            observations.push(obs);
        }
        // 2 status gauges for the failing scraper, 8 counters + 2 gauges for the other.
        assert_eq!(observations.len(), 12);

        let status: Vec<(String, f64)> = observations
            .iter()
            .filter(|o| std::ptr::eq(o.descriptor(), &*COLLECTOR_SUCCESS))
            .map(|o| (o.label_values()[0].clone(), o.value()))
            .collect();
        assert_eq!(
            status,
            vec![
                ("test.failing".to_string(), 0.0),
                ("sys.user_summary_by_statement_type".to_string(), 1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_once_reports_cancelled_scrapers() {
        let source = MemorySource::new(vec![sample_row()]).with_stall();
        let (sink, mut rx) = metric::channel(64);
        let ctx = ScrapeContext::new();
        ctx.cancel();

        let outcomes = registry().collect_once(&ctx, &source, &sink).await;
        drop(sink);

        assert_eq!(outcomes[0].result, Err(ScrapeError::Query("boom".into())));
        assert_eq!(outcomes[1].result, Err(ScrapeError::Cancelled));

        let mut status = Vec::new();
        while let Some(obs) = rx.recv().await {
            if std::ptr::eq(obs.descriptor(), &*COLLECTOR_SUCCESS) {
                status.push((obs.label_values()[0].clone(), obs.value()));
            }
        }
        assert_eq!(
            status,
            vec![
                ("test.failing".to_string(), 0.0),
                ("sys.user_summary_by_statement_type".to_string(), 0.0),
            ]
        );
    }
}
