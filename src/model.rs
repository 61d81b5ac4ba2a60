//! Typed views of the Storm UI API documents.
//!
//! Every numeric field is a [`Metric`], which decodes absent and `null` values
//! as zero. Lists at the top of a document are required: a body without them
//! is not the document we asked for.

use serde::{Deserialize, Deserializer, de::Error as _};
use std::{collections::BTreeMap, ops::Deref};

/// A numeric stat from the API.
///
/// Absent and `null` become `0`. Storm serves some stats (latencies, bolt
/// capacity) as strings like `"10.458"`; those are parsed. Anything else is a
/// decode error.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Metric(pub f64);

impl Deref for Metric {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Self(0.0)),
            Some(Raw::Number(n)) => Ok(Self(n)),
            Some(Raw::Text(s)) => s
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| D::Error::custom(format!("expected a number, found {s:?}"))),
        }
    }
}

/// `/api/v1/cluster/summary`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSummary {
    pub supervisors: Metric,
    pub topologies: Metric,
    pub slots_total: Metric,
    pub slots_used: Metric,
    pub slots_free: Metric,
    pub executors_total: Metric,
    pub tasks_total: Metric,
    pub total_mem: Metric,
    pub avail_mem: Metric,
    pub mem_assigned_percent_util: Metric,
    pub total_cpu: Metric,
    pub avail_cpu: Metric,
    pub cpu_assigned_percent_util: Metric,
}

/// `/api/v1/nimbus/summary`
#[derive(Debug, Clone, Deserialize)]
pub struct NimbusSummary {
    pub nimbuses: Vec<Nimbus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Nimbus {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `/api/v1/supervisor/summary`
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSummary {
    pub supervisors: Vec<Supervisor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Supervisor {
    pub host: Option<String>,
    pub uptime_seconds: Metric,
    pub slots_total: Metric,
    pub slots_used: Metric,
    pub total_mem: Metric,
    pub used_mem: Metric,
    pub total_cpu: Metric,
    pub used_cpu: Metric,
}

/// `/api/v1/topology/summary`
#[derive(Debug, Clone, Deserialize)]
pub struct TopologySummary {
    pub topologies: Vec<Topology>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Topology {
    pub name: Option<String>,
    pub id: Option<String>,
    pub uptime_seconds: Metric,
    pub tasks_total: Metric,
    pub workers_total: Metric,
    pub executors_total: Metric,
    pub replication_count: Metric,
    pub requested_mem_on_heap: Metric,
    pub requested_mem_off_heap: Metric,
    pub requested_total_mem: Metric,
    pub requested_cpu: Metric,
    pub assigned_mem_on_heap: Metric,
    pub assigned_mem_off_heap: Metric,
    pub assigned_total_mem: Metric,
    pub assigned_cpu: Metric,
}

/// `/api/v1/topology/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyDetail {
    pub topology_stats: Vec<WindowStats>,
    pub workers: Vec<Worker>,
    pub spouts: Vec<Spout>,
    pub bolts: Vec<Bolt>,
}

/// Topology-wide stats over one reporting window (`600`, `10800`, `86400`,
/// `:all-time`, ...). The window vocabulary belongs to Storm.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowStats {
    pub window: Option<String>,
    pub transferred: Metric,
    pub emitted: Metric,
    pub complete_latency: Metric,
    pub acked: Metric,
    pub failed: Metric,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Worker {
    pub host: Option<String>,
    pub port: Option<u32>,
    pub assigned_mem_on_heap: Metric,
    pub executors_total: Metric,
    pub assigned_cpu: Metric,
    pub component_num_tasks: Option<BTreeMap<String, Metric>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spout {
    pub spout_id: Option<String>,
    pub executors: Metric,
    pub emitted: Metric,
    pub complete_latency: Metric,
    pub transferred: Metric,
    pub tasks: Metric,
    pub acked: Metric,
    pub failed: Metric,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bolt {
    pub bolt_id: Option<String>,
    pub process_latency: Metric,
    pub capacity: Metric,
    pub execute_latency: Metric,
    pub executors: Metric,
    pub tasks: Metric,
    pub acked: Metric,
    pub failed: Metric,
    pub emitted: Metric,
}
