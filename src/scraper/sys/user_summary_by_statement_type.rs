//! Scrape `sys.x$user_summary_by_statement_type`.
//!
//! One row per (user, statement type) pair; each row becomes eight counter
//! observations labelled with the user and the statement.

use std::sync::LazyLock;

use strum_macros::{AsRefStr, Display};

use crate::metric::{MetricDescriptor, Observation, ObservationSink};
use crate::scraper::sys::SYS_SCHEMA;
use crate::scraper::{FromSqlRow, ScrapeContext, ScrapeError, Scraper, ServerVersion, execute};
use crate::source::{DataSource, SqlRow};

/// Fixed projection; column order is part of the decoding contract.
pub const USER_SUMMARY_QUERY: &str = "\
SELECT
    user,
    statement,
    total,
    total_latency,
    max_latency,
    lock_latency,
    rows_sent,
    rows_examined,
    rows_affected,
    full_scans
FROM
    sys.x$user_summary_by_statement_type";

const LABELS: &[&str] = &["user", "statement"];

static DESCRIPTORS: LazyLock<[MetricDescriptor; 8]> = LazyLock::new(|| {
    StatementCounter::ALL.map(|counter| {
        MetricDescriptor::counter(SYS_SCHEMA, counter.suffix(), counter.help(), LABELS)
    })
});

/// The counters exposed per (user, statement) row, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StatementCounter {
    TotalStatements,
    TotalLatency,
    MaxLatency,
    LockLatency,
    RowsSent,
    RowsExamined,
    RowsAffected,
    FullScans,
}

impl StatementCounter {
    /// Every counter in emission order.
    pub const ALL: [Self; 8] = [
        Self::TotalStatements,
        Self::TotalLatency,
        Self::MaxLatency,
        Self::LockLatency,
        Self::RowsSent,
        Self::RowsExamined,
        Self::RowsAffected,
        Self::FullScans,
    ];

    /// Descriptor for this counter.
    pub fn descriptor(self) -> &'static MetricDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Read this counter from a row.
    pub fn value(self, row: &UserStatementRow) -> u64 {
        match self {
            Self::TotalStatements => row.total,
            Self::TotalLatency => row.total_latency,
            Self::MaxLatency => row.max_latency,
            Self::LockLatency => row.lock_latency,
            Self::RowsSent => row.rows_sent,
            Self::RowsExamined => row.rows_examined,
            Self::RowsAffected => row.rows_affected,
            Self::FullScans => row.full_scans,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::TotalStatements => "user_total_statements",
            Self::TotalLatency => "user_statement_total_latency",
            Self::MaxLatency => "user_statement_max_latency",
            Self::LockLatency => "user_statement_lock_latency",
            Self::RowsSent => "rows_sent_by_user",
            Self::RowsExamined => "rows_examined_by_user",
            Self::RowsAffected => "rows_affected_by_user",
            Self::FullScans => "full_scans_by_user",
        }
    }

    fn help(self) -> &'static str {
        match self {
            Self::TotalStatements => {
                "The total number of occurrences of the statement event for the user"
            }
            Self::TotalLatency => {
                "The total wait time of timed occurrences of the statement event for the user"
            }
            Self::MaxLatency => {
                "The maximum single wait time of timed occurrences of the statement event for the user"
            }
            Self::LockLatency => {
                "The total time waiting for locks by timed occurrences of the statement event for the user"
            }
            Self::RowsSent => {
                "The total number of rows returned by occurrences of the statement event for the user"
            }
            Self::RowsExamined => {
                "The total number of rows read from storage engines by occurrences of the statement event for the user"
            }
            Self::RowsAffected => {
                "The total number of rows affected by occurrences of the statement event for the user"
            }
            Self::FullScans => {
                "The total number of full table scans by occurrences of the statement event for the user"
            }
        }
    }
}

/// One decoded row of the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStatementRow {
    pub user: String,
    pub statement: String,
    pub total: u64,
    pub total_latency: u64,
    pub max_latency: u64,
    pub lock_latency: u64,
    pub rows_sent: u64,
    pub rows_examined: u64,
    pub rows_affected: u64,
    pub full_scans: u64,
}

impl FromSqlRow for UserStatementRow {
    const QUERY: &'static str = USER_SUMMARY_QUERY;
    const COLUMNS: usize = 10;

    fn from_sql_row(row: &SqlRow) -> Result<Self, String> {
        Ok(Self {
            user: row.get_str(0)?.to_string(),
            statement: row.get_str(1)?.to_string(),
            total: row.get_u64(2)?,
            total_latency: row.get_u64(3)?,
            max_latency: row.get_u64(4)?,
            lock_latency: row.get_u64(5)?,
            rows_sent: row.get_u64(6)?,
            rows_examined: row.get_u64(7)?,
            rows_affected: row.get_u64(8)?,
            full_scans: row.get_u64(9)?,
        })
    }
}

/// Map one row to its eight observations, in [`StatementCounter::ALL`] order.
///
/// Values are widened to `f64`; counters above 2^53 are subject to the usual
/// floating-point rounding.
pub fn map_row(row: &UserStatementRow) -> [Observation; 8] {
    StatementCounter::ALL.map(|counter| {
        Observation::from_parts(
            counter.descriptor(),
            counter.value(row) as f64,
            vec![row.user.clone(), row.statement.clone()],
        )
    })
}

/// Scraper for `sys.x$user_summary_by_statement_type`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysUserSummaryByStatementType;

#[async_trait::async_trait]
impl Scraper for SysUserSummaryByStatementType {
    fn name(&self) -> &'static str {
        "sys.user_summary_by_statement_type"
    }

    fn help(&self) -> &'static str {
        "Collect per user metrics from sys.x$user_summary_by_statement_type See https://dev.mysql.com/doc/refman/5.7/en/sys-user-summary-by-statement-type.html"
    }

    fn version(&self) -> ServerVersion {
        ServerVersion::new(5, 7, 0)
    }

    /// Rows already pushed stay pushed when a later row fails to decode.
    async fn scrape(
        &self,
        ctx: &ScrapeContext,
        source: &dyn DataSource,
        sink: &ObservationSink,
    ) -> Result<(), ScrapeError> {
        let mut rows = execute::<UserStatementRow>(ctx, source).await?;

        let mut pushed = 0usize;
        while let Some(row) = rows.try_next().await? {
            for obs in map_row(&row) {
                sink.push(ctx, obs).await?;
                pushed += 1;
            }
        }

        tracing::debug!(
            scraper = self.name(),
            rows = rows.rows_fetched(),
            observations = pushed,
            "Scrape finished"
        );
        Ok(())
    }
}
