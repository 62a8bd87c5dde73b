//! Scrapers for the `sys` schema.
//!
//! - [`SysUserSummaryByStatementType`]: per user, per statement type totals

mod user_summary_by_statement_type;

pub use user_summary_by_statement_type::{
    StatementCounter, SysUserSummaryByStatementType, USER_SUMMARY_QUERY, UserStatementRow, map_row,
};

/// Schema holding the diagnostic views, also the metric sub-namespace.
pub const SYS_SCHEMA: &str = "sys";
