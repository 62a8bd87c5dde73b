//! Metric observations.

use thiserror::Error;

use crate::metric::MetricDescriptor;

/// Errors raised when binding values to a descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObservationError {
    /// Label value count does not match the descriptor's label names.
    #[error("{metric}: expected {expected} label values, got {actual}")]
    LabelArity {
        metric: String,
        expected: usize,
        actual: usize,
    },
}

/// One value of one descriptor at one point in time, with label values bound.
///
/// Observations are produced by scrapers and consumed immediately by the sink;
/// they are never retained across collection cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    descriptor: &'static MetricDescriptor,
    value: f64,
    label_values: Vec<String>,
}

impl Observation {
    /// Bind a value and label values to a descriptor.
    ///
    /// # Errors
    /// Returns `ObservationError::LabelArity` if the number of label values
    /// differs from the descriptor's label names.
    pub fn new(
        descriptor: &'static MetricDescriptor,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<Self, ObservationError> {
        let expected = descriptor.label_names().len();
        if label_values.len() != expected {
            return Err(ObservationError::LabelArity {
                metric: descriptor.fq_name().to_string(),
                expected,
                actual: label_values.len(),
            });
        }
        Ok(Self::from_parts(descriptor, value, label_values))
    }

    /// Build an observation whose arity is guaranteed by the caller.
    pub(crate) fn from_parts(
        descriptor: &'static MetricDescriptor,
        value: f64,
        label_values: Vec<String>,
    ) -> Self {
        debug_assert_eq!(label_values.len(), descriptor.label_names().len());
        Self {
            descriptor,
            value,
            label_values,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &'static MetricDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label name/value pairs in descriptor order.
    pub fn labels(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.descriptor
            .label_names()
            .iter()
            .copied()
            .zip(self.label_values.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::metric::ValueType;

    static TEST_DESC: LazyLock<MetricDescriptor> = LazyLock::new(|| {
        MetricDescriptor::new("test_total", "Test.", &["user", "statement"], ValueType::Counter)
    });

    #[test]
    fn test_observation_label_arity_checked() {
        let err = Observation::new(&TEST_DESC, 1.0, vec!["app".into()]).unwrap_err();
        assert_eq!(
            err,
            ObservationError::LabelArity {
                metric: "test_total".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_observation_labels_pair_names_with_values() {
        let obs = Observation::new(&TEST_DESC, 10.0, vec!["app".into(), "select".into()]).unwrap();
        let labels: Vec<_> = obs.labels().collect();
        assert_eq!(labels, vec![("user", "app"), ("statement", "select")]);
        assert_eq!(obs.value(), 10.0);
    }
}
