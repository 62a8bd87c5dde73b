//! Metric Layer
//!
//! Immutable metric metadata and the values scrapers emit against it.
//!
//! # Components
//!
//! - [`MetricDescriptor`]: Name, help text, label names and value type of a series
//! - [`Observation`]: One value of one descriptor with its label values bound
//! - [`ObservationSink`]: Bounded, cancellation-aware channel scrapers push into
//! - [`metric_families`] / [`render_text`]: `prometheus` families and text exposition

mod descriptor;
mod exposition;
mod observation;
mod sink;

pub use descriptor::{MetricDescriptor, NAMESPACE, ValueType, build_fq_name};
pub use exposition::{metric_families, render_text};
pub use observation::{Observation, ObservationError};
pub use sink::{ObservationSink, channel};
