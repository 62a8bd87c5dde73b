//! Metric descriptors.

use strum_macros::{AsRefStr, Display};

/// Process-wide metric namespace.
pub const NAMESPACE: &str = "mysql";

/// How the exposition layer classifies a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    /// Monotonically non-decreasing cumulative value.
    Counter,
    /// Point-in-time value that may go up or down.
    Gauge,
    /// Value with no declared semantics.
    Untyped,
}

/// Immutable metadata identifying a metric time series.
///
/// The label-name sequence is fixed for the descriptor's lifetime; every
/// [`Observation`](crate::metric::Observation) bound to it carries exactly
/// that many label values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    fq_name: String,
    help: &'static str,
    label_names: &'static [&'static str],
    value_type: ValueType,
}

impl MetricDescriptor {
    /// Create a descriptor from an already qualified name.
    pub fn new(
        fq_name: impl Into<String>,
        help: &'static str,
        label_names: &'static [&'static str],
        value_type: ValueType,
    ) -> Self {
        Self {
            fq_name: fq_name.into(),
            help,
            label_names,
            value_type,
        }
    }

    /// Create a counter descriptor named `<namespace>_<subsystem>_<name>`.
    pub fn counter(
        subsystem: &str,
        name: &str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self::new(
            build_fq_name(NAMESPACE, subsystem, name),
            help,
            label_names,
            ValueType::Counter,
        )
    }

    /// Create a gauge descriptor named `<namespace>_<subsystem>_<name>`.
    pub fn gauge(
        subsystem: &str,
        name: &str,
        help: &'static str,
        label_names: &'static [&'static str],
    ) -> Self {
        Self::new(
            build_fq_name(NAMESPACE, subsystem, name),
            help,
            label_names,
            ValueType::Gauge,
        )
    }

    #[inline]
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    #[inline]
    pub fn help(&self) -> &'static str {
        self.help
    }

    #[inline]
    pub fn label_names(&self) -> &'static [&'static str] {
        self.label_names
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// Join the non-empty parts of a metric name with underscores.
///
/// # Examples
///
/// ```
/// use mysqld_sys_scraper::metric::build_fq_name;
///
/// assert_eq!(build_fq_name("mysql", "sys", "full_scans_by_user"), "mysql_sys_full_scans_by_user");
/// assert_eq!(build_fq_name("mysql", "", "up"), "mysql_up");
/// assert_eq!(build_fq_name("", "", ""), "");
/// ```
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    [namespace, subsystem, name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
