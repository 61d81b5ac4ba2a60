//! The [`MetricRegistry`]: typed, labeled series on top of a Prometheus
//! recorder.

use crate::{
    RegistryError,
    catalog::{self, MetricDesc, MetricKind},
};
use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusHandle, PrometheusRecorder};
use std::collections::HashMap;
use tracing::trace;

/// One value destined for one series, as produced by [`crate::extract`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Series name, as declared in the [`catalog`].
    pub metric: &'static str,

    /// Label values, in the order of the series' declared label keys.
    pub labels: Vec<String>,

    pub value: SampleValue,
}

/// A gauge reading or the current state of a categorical series.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Gauge(f64),
    State(String),
}

impl Sample {
    /// A gauge sample for `desc` with label values in declared order.
    pub fn gauge(desc: &MetricDesc, labels: &[&str], value: f64) -> Self {
        Self {
            metric: desc.name,
            labels: labels.iter().map(|l| (*l).to_owned()).collect(),
            value: SampleValue::Gauge(value),
        }
    }

    /// A state sample for `desc`. The state is checked when applied.
    pub fn state(desc: &MetricDesc, labels: &[&str], state: &str) -> Self {
        Self {
            metric: desc.name,
            labels: labels.iter().map(|l| (*l).to_owned()).collect(),
            value: SampleValue::State(state.to_owned()),
        }
    }
}

/// Registry of every series this process exposes.
///
/// The schema is fixed once the registry is shared: [`MetricRegistry::register`]
/// needs `&mut self`, writes only need `&self`. Each series value lives in its
/// own atomic cell inside the recorder, so writers never block scrapes and a
/// reader never sees half of a value. A reader may see one series from this
/// cycle next to another from the previous one.
///
/// Series are never removed. A supervisor that leaves the cluster keeps
/// exporting its last values until the process restarts.
pub struct MetricRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    schema: HashMap<&'static str, MetricDesc>,
}

impl MetricRegistry {
    /// An empty registry over `recorder`.
    pub fn new(recorder: PrometheusRecorder) -> Self {
        let handle = recorder.handle();
        Self {
            recorder,
            handle,
            schema: HashMap::new(),
        }
    }

    /// A registry with every series from the [`catalog`] declared.
    pub fn with_catalog(recorder: PrometheusRecorder) -> Result<Self, RegistryError> {
        let mut registry = Self::new(recorder);
        for desc in catalog::ALL {
            registry.register(*desc)?;
        }
        Ok(registry)
    }

    /// Declare a series. Declaring the same series twice is a no-op, declaring
    /// a known name with a different label schema or kind is an error.
    pub fn register(&mut self, desc: MetricDesc) -> Result<(), RegistryError> {
        if let Some(existing) = self.schema.get(desc.name) {
            if existing.labels == desc.labels && existing.kind == desc.kind {
                return Ok(());
            }
            return Err(RegistryError::SchemaConflict {
                name: desc.name.to_owned(),
            });
        }

        self.recorder.describe_gauge(
            KeyName::from_const_str(desc.name),
            None,
            SharedString::const_str(desc.help),
        );
        self.schema.insert(desc.name, desc);
        Ok(())
    }

    /// Set a gauge series.
    pub fn set<S: AsRef<str>>(
        &self,
        name: &str,
        labels: &[S],
        value: f64,
    ) -> Result<(), RegistryError> {
        let desc = self.lookup(name, labels.len())?;
        if desc.kind != MetricKind::Gauge {
            return Err(RegistryError::KindMismatch {
                name: name.to_owned(),
                expected: "gauge",
            });
        }

        let key = Key::from_parts(desc.name, label_pairs(desc.labels, labels));
        self.recorder.register_gauge(&key, &metadata()).set(value);
        trace!(metric = desc.name, value, "set gauge");
        Ok(())
    }

    /// Set a categorical series. Every declared state is exported as its own
    /// sample, labeled with the state name: `1` for `state`, `0` for the rest.
    pub fn set_state<S: AsRef<str>>(
        &self,
        name: &str,
        labels: &[S],
        state: &str,
    ) -> Result<(), RegistryError> {
        let desc = self.lookup(name, labels.len())?;
        let MetricKind::State(states) = desc.kind else {
            return Err(RegistryError::KindMismatch {
                name: name.to_owned(),
                expected: "state",
            });
        };
        if !states.iter().any(|known| *known == state) {
            return Err(RegistryError::InvalidState {
                name: name.to_owned(),
                state: state.to_owned(),
            });
        }

        for candidate in states {
            let mut pairs = label_pairs(desc.labels, labels);
            pairs.push(Label::new(desc.name, *candidate));
            let key = Key::from_parts(desc.name, pairs);
            let value = if *candidate == state { 1.0 } else { 0.0 };
            self.recorder.register_gauge(&key, &metadata()).set(value);
        }
        trace!(metric = desc.name, state, "set state");
        Ok(())
    }

    /// Write a batch of samples, stopping at the first contract violation.
    pub fn apply(&self, samples: &[Sample]) -> Result<(), RegistryError> {
        for sample in samples {
            match &sample.value {
                SampleValue::Gauge(value) => self.set(sample.metric, &sample.labels, *value)?,
                SampleValue::State(state) => self.set_state(sample.metric, &sample.labels, state)?,
            }
        }
        Ok(())
    }

    /// Render every series in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    fn lookup(&self, name: &str, arity: usize) -> Result<&MetricDesc, RegistryError> {
        let desc = self
            .schema
            .get(name)
            .ok_or_else(|| RegistryError::UnknownMetric {
                name: name.to_owned(),
            })?;
        if desc.labels.len() != arity {
            return Err(RegistryError::LabelArityMismatch {
                name: name.to_owned(),
                expected: desc.labels.len(),
                got: arity,
            });
        }
        Ok(desc)
    }
}

fn label_pairs<S: AsRef<str>>(keys: &'static [&'static str], values: &[S]) -> Vec<Label> {
    keys.iter()
        .zip(values)
        .map(|(key, value)| Label::new(*key, value.as_ref().to_owned()))
        .collect()
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

/// Look up the value of one rendered series, e.g.
/// `sample_value(&text, r#"supervisor_slots_used{Supervisor="h1"}"#)`.
#[cfg(test)]
pub(crate) fn sample_value(rendered: &str, series: &str) -> Option<f64> {
    rendered.lines().find_map(|line| {
        line.strip_prefix(series)?
            .strip_prefix(' ')?
            .trim()
            .parse()
            .ok()
    })
}

/// Rendered sample lines in a stable order. The recorder renders series in
/// hash-map order, so two renders of equal content may differ textually.
#[cfg(test)]
pub(crate) fn sorted_samples(rendered: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = rendered
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    lines.sort_unstable();
    lines
}
