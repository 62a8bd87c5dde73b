//! Prometheus exposition.
//!
//! Converts drained observations into `prometheus` metric families, so they
//! can be encoded with any `prometheus` encoder or merged with the families
//! gathered from a `prometheus::Registry`.

use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType, Untyped};
use prometheus::{Encoder, TextEncoder};

use crate::metric::{Observation, ValueType};

/// Group observations into metric families.
///
/// Families appear in the order their first observation was seen; samples
/// within a family keep their push order.
pub fn metric_families(observations: &[Observation]) -> Vec<MetricFamily> {
    let mut families: Vec<MetricFamily> = Vec::new();
    for obs in observations {
        let desc = obs.descriptor();
        let index = match families.iter().position(|f| f.get_name() == desc.fq_name()) {
            Some(index) => index,
            None => {
                let mut family = MetricFamily::default();
                family.set_name(desc.fq_name().to_string());
                family.set_help(desc.help().to_string());
                family.set_field_type(metric_type(desc.value_type()));
                families.push(family);
                families.len() - 1
            }
        };
        families[index].mut_metric().push(to_metric(obs));
    }
    families
}

/// Render observations into Prometheus text format.
///
/// # Errors
/// Returns `prometheus::Error` if a family cannot be encoded.
pub fn render_text(observations: &[Observation]) -> Result<String, prometheus::Error> {
    let families = metric_families(observations);
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

fn metric_type(value_type: ValueType) -> MetricType {
    match value_type {
        ValueType::Counter => MetricType::COUNTER,
        ValueType::Gauge => MetricType::GAUGE,
        ValueType::Untyped => MetricType::UNTYPED,
    }
}

fn to_metric(obs: &Observation) -> Metric {
    let mut metric = Metric::default();
    for (name, value) in obs.labels() {
        let mut pair = LabelPair::default();
        pair.set_name(name.to_string());
        pair.set_value(value.to_string());
        metric.mut_label().push(pair);
    }

    match obs.descriptor().value_type() {
        ValueType::Counter => {
            let mut counter = Counter::default();
            counter.set_value(obs.value());
            metric.set_counter(counter);
        }
        ValueType::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(obs.value());
            metric.set_gauge(gauge);
        }
        ValueType::Untyped => {
            let mut untyped = Untyped::default();
            untyped.set_value(obs.value());
            metric.set_untyped(untyped);
        }
    }
    metric
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::metric::MetricDescriptor;

    static ROWS: LazyLock<MetricDescriptor> = LazyLock::new(|| {
        MetricDescriptor::counter("sys", "rows_sent_by_user", "Rows sent.", &["user"])
    });
    static UP: LazyLock<MetricDescriptor> =
        LazyLock::new(|| MetricDescriptor::new("mysql_up", "Server up.", &[], ValueType::Gauge));
    static PAIR: LazyLock<MetricDescriptor> = LazyLock::new(|| {
        MetricDescriptor::counter("sys", "pair_total", "Pair.", &["user", "statement"])
    });

    fn obs(desc: &'static MetricDescriptor, value: f64, labels: &[&str]) -> Observation {
        Observation::new(desc, value, labels.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn render_empty() {
        assert_eq!(render_text(&[]).unwrap(), "");
    }

    #[test]
    fn families_carry_type_and_samples() {
        let families = metric_families(&[
            obs(&ROWS, 1.0, &["a"]),
            obs(&UP, 1.0, &[]),
            obs(&ROWS, 2.0, &["b"]),
        ]);

        assert_eq!(families.len(), 2);
        assert_eq!(families[0].get_name(), "mysql_sys_rows_sent_by_user");
        assert_eq!(families[0].get_field_type(), MetricType::COUNTER);
        assert_eq!(families[0].get_metric().len(), 2);
        assert_eq!(families[0].get_metric()[1].get_counter().get_value(), 2.0);
        assert_eq!(families[0].get_metric()[1].get_label()[0].get_value(), "b");
        assert_eq!(families[1].get_field_type(), MetricType::GAUGE);
        assert_eq!(families[1].get_metric()[0].get_gauge().get_value(), 1.0);
    }

    #[test]
    fn render_groups_by_descriptor_in_first_seen_order() {
        let output = render_text(&[
            obs(&ROWS, 1.0, &["a"]),
            obs(&UP, 1.0, &[]),
            obs(&ROWS, 2.0, &["b"]),
        ])
        .unwrap();

        let expected = "\
# HELP mysql_sys_rows_sent_by_user Rows sent.
# TYPE mysql_sys_rows_sent_by_user counter
mysql_sys_rows_sent_by_user{user=\"a\"} 1
mysql_sys_rows_sent_by_user{user=\"b\"} 2
# HELP mysql_up Server up.
# TYPE mysql_up gauge
mysql_up 1
";
        assert_eq!(output, expected);
    }

    #[test]
    fn render_keeps_label_order_and_escapes_values() {
        let output = render_text(&[obs(&PAIR, 0.5, &["a\"b", "c\\d\ne"])]).unwrap();
        assert!(output.contains(r#"mysql_sys_pair_total{user="a\"b",statement="c\\d\ne"} 0.5"#));
    }
}
