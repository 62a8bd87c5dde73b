//! End-to-end tests for the scrape pipeline
//!
//! Drives the built-in registry against scripted rows and checks the rendered
//! exposition.

use std::time::Duration;

use mysqld_sys_scraper::metric::{self, Observation, render_text};
use mysqld_sys_scraper::scraper::sys::USER_SUMMARY_QUERY;
use mysqld_sys_scraper::scraper::{ScrapeContext, ScrapeError, ScraperRegistry, ServerVersion};
use mysqld_sys_scraper::source::{MemorySource, SqlRow, SqlValue};
use tokio::sync::mpsc;

// =============================================================================
// Test Helpers
// =============================================================================

fn row(user: &str, statement: &str, counters: [u64; 8]) -> SqlRow {
    let mut values = vec![SqlValue::from(user), SqlValue::from(statement)];
    values.extend(counters.map(SqlValue::UInt));
    SqlRow::new(values)
}

async fn drain(mut rx: mpsc::Receiver<Observation>) -> Vec<Observation> {
    let mut out = Vec::new();
    while let Some(obs) = rx.recv().await {
        out.push(obs);
    }
    out
}

// =============================================================================
// Pipeline
// =============================================================================

#[tokio::test]
async fn test_collect_and_render() {
    let source = MemorySource::new(vec![
        row("app", "select", [10, 500, 50, 5, 100, 200, 0, 1]),
        row("background", "insert", [3, 30, 20, 0, 0, 0, 3, 0]),
    ]);
    let (sink, rx) = metric::channel(64);

    let outcomes = ScraperRegistry::builtin()
        .collect_once(&ScrapeContext::new(), &source, &sink)
        .await;
    drop(sink);
    let observations = drain(rx).await;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.is_ok());
    assert_eq!(source.queries(), vec![USER_SUMMARY_QUERY.to_string()]);
    assert_eq!(source.open_cursors(), 0);
    // 2 rows x 8 counters + success + duration
    assert_eq!(observations.len(), 18);

    let text = render_text(&observations).unwrap();
    assert!(text.contains("# TYPE mysql_sys_user_total_statements counter\n"));
    assert!(text.contains("# HELP mysql_sys_user_total_statements "));
    assert!(text.contains(
        r#"mysql_sys_user_total_statements{user="app",statement="select"} 10"#
    ));
    assert!(text.contains(
        r#"mysql_sys_user_total_statements{user="background",statement="insert"} 3"#
    ));
    assert!(text.contains(
        r#"mysql_sys_rows_examined_by_user{user="app",statement="select"} 200"#
    ));
    assert!(text.contains(
        r#"mysql_exporter_collector_success{collector="sys.user_summary_by_statement_type"} 1"#
    ));
    assert!(text.contains("# TYPE mysql_exporter_collector_duration_seconds gauge\n"));

    // Each family header appears exactly once.
    assert_eq!(
        text.matches("# TYPE mysql_sys_user_total_statements ").count(),
        1
    );
}

#[tokio::test]
async fn test_empty_view_reports_success_only() {
    let source = MemorySource::new(Vec::new());
    let (sink, rx) = metric::channel(8);

    let outcomes = ScraperRegistry::builtin()
        .collect_once(&ScrapeContext::new(), &source, &sink)
        .await;
    drop(sink);
    let observations = drain(rx).await;

    assert!(outcomes[0].result.is_ok());
    assert_eq!(observations.len(), 2);
    assert!(
        observations
            .iter()
            .all(|o| o.descriptor().fq_name().starts_with("mysql_exporter_"))
    );
}

#[tokio::test]
async fn test_query_failure_marks_collector_failed() {
    let source = MemorySource::new(Vec::new()).with_query_error("Table 'sys.x$foo' doesn't exist");
    let (sink, rx) = metric::channel(8);

    let outcomes = ScraperRegistry::builtin()
        .collect_once(&ScrapeContext::new(), &source, &sink)
        .await;
    drop(sink);
    let observations = drain(rx).await;

    assert!(matches!(outcomes[0].result, Err(ScrapeError::Query(_))));
    let text = render_text(&observations).unwrap();
    assert!(text.contains(
        r#"mysql_exporter_collector_success{collector="sys.user_summary_by_statement_type"} 0"#
    ));
    assert!(!text.contains("mysql_sys_user_"));
}

#[tokio::test]
async fn test_decode_failure_keeps_earlier_rows() {
    let source = MemorySource::new(vec![
        row("a", "select", [1; 8]),
        row("b", "select", [2; 8]),
    ])
    .with_decode_error_at(1, "bad column");
    let (sink, rx) = metric::channel(64);

    let outcomes = ScraperRegistry::builtin()
        .collect_once(&ScrapeContext::new(), &source, &sink)
        .await;
    drop(sink);
    let observations = drain(rx).await;

    assert!(matches!(
        outcomes[0].result,
        Err(ScrapeError::Decode { row: 2, .. })
    ));
    // First row's 8 counters + the two status gauges.
    assert_eq!(observations.len(), 10);
    assert_eq!(source.open_cursors(), 0);
}

#[tokio::test]
async fn test_deadline_stops_stalled_scrape() {
    let source = MemorySource::new(vec![row("a", "select", [1; 8])]).with_stall();
    let (sink, rx) = metric::channel(64);
    let ctx = ScrapeContext::new().with_timeout(Duration::from_millis(50));

    let outcomes = tokio::time::timeout(
        Duration::from_secs(5),
        ScraperRegistry::builtin().collect_once(&ctx, &source, &sink),
    )
    .await
    .expect("scrape should observe the deadline");
    drop(sink);
    let observations = drain(rx).await;

    assert!(matches!(outcomes[0].result, Err(ScrapeError::Cancelled)));
    assert_eq!(source.open_cursors(), 0);
    // The row fetched before the stall, then both status gauges.
    assert_eq!(observations.len(), 10);

    let success: Vec<f64> = observations
        .iter()
        .filter(|o| o.descriptor().fq_name() == "mysql_exporter_collector_success")
        .map(|o| o.value())
        .collect();
    assert_eq!(success, vec![0.0]);

    let text = render_text(&observations).unwrap();
    assert!(text.contains(
        r#"mysql_exporter_collector_success{collector="sys.user_summary_by_statement_type"} 0"#
    ));
    assert!(text.contains("mysql_exporter_collector_duration_seconds{"));
}

#[tokio::test]
async fn test_old_server_skips_sys_scraper() {
    let registry = ScraperRegistry::builtin().supported_by(ServerVersion::new(5, 6, 40));
    assert!(registry.is_empty());

    let source = MemorySource::new(vec![row("a", "select", [1; 8])]);
    let (sink, rx) = metric::channel(8);
    let outcomes = registry
        .collect_once(&ScrapeContext::new(), &source, &sink)
        .await;
    drop(sink);

    assert!(outcomes.is_empty());
    assert!(source.queries().is_empty());
    assert!(drain(rx).await.is_empty());
}
