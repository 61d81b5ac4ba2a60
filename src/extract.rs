//! Mapping from API documents to [`Sample`]s.
//!
//! These functions do no I/O and never touch the registry. Entries that lack
//! the field their labels are built from are skipped with a warning, their
//! siblings are still mapped.

use crate::{
    MissingIdentity,
    catalog::*,
    model::{
        Bolt, ClusterSummary, Nimbus, NimbusSummary, Spout, Supervisor, SupervisorSummary,
        Topology, TopologyDetail, WindowStats, Worker,
    },
    registry::Sample,
};
use tracing::warn;

/// The `(name, id)` pair that labels every series of one topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyIdentity {
    pub name: String,
    pub id: String,
}

impl TopologyIdentity {
    fn labels(&self) -> [&str; 2] {
        [self.name.as_str(), self.id.as_str()]
    }
}

pub fn cluster(summary: &ClusterSummary) -> Vec<Sample> {
    [
        (&CLUSTER_SUPERVISORS_TOTAL, summary.supervisors),
        (&CLUSTER_TOPOLOGIES_TOTAL, summary.topologies),
        (&CLUSTER_TOTAL_WORKER_SLOTS, summary.slots_total),
        (&CLUSTER_USED_WORKER_SLOTS, summary.slots_used),
        (&CLUSTER_FREE_WORKER_SLOTS, summary.slots_free),
        (&CLUSTER_EXECUTORS_TOTAL, summary.executors_total),
        (&CLUSTER_TASKS_TOTAL, summary.tasks_total),
        (&CLUSTER_MEM_TOTAL, summary.total_mem),
        (&CLUSTER_MEM_AVAIL, summary.avail_mem),
        (&CLUSTER_MEM_ASSIGNED_PERCENT_UTIL, summary.mem_assigned_percent_util),
        (&CLUSTER_CPU_TOTAL, summary.total_cpu),
        (&CLUSTER_CPU_AVAIL, summary.avail_cpu),
        (&CLUSTER_CPU_ASSIGNED_PERCENT_UTIL, summary.cpu_assigned_percent_util),
    ]
    .into_iter()
    .map(|(desc, value)| Sample::gauge(desc, &[], *value))
    .collect()
}

pub fn nimbuses(summary: &NimbusSummary) -> Vec<Sample> {
    summary.nimbuses.iter().filter_map(nimbus).collect()
}

fn nimbus(nimbus: &Nimbus) -> Option<Sample> {
    let Some(host) = non_empty(&nimbus.host) else {
        warn!("skipping nimbus without a host");
        return None;
    };
    // A missing status is not in the state vocabulary; let the registry
    // reject it rather than guess one.
    let status = nimbus.status.as_deref().unwrap_or_default();
    Some(Sample::state(&NIMBUS_STATUS, &[host], status))
}

pub fn supervisors(summary: &SupervisorSummary) -> Vec<Sample> {
    summary.supervisors.iter().flat_map(supervisor).collect()
}

fn supervisor(supervisor: &Supervisor) -> Vec<Sample> {
    let Some(host) = non_empty(&supervisor.host) else {
        warn!("skipping supervisor without a host");
        return Vec::new();
    };
    [
        (&SUPERVISOR_UPTIME_SECOND, supervisor.uptime_seconds),
        (&SUPERVISOR_SLOTS_TOTAL, supervisor.slots_total),
        (&SUPERVISOR_SLOTS_USED, supervisor.slots_used),
        (&SUPERVISOR_MEM_TOTAL, supervisor.total_mem),
        (&SUPERVISOR_MEM_USED, supervisor.used_mem),
        (&SUPERVISOR_CPU_TOTAL, supervisor.total_cpu),
        (&SUPERVISOR_CPU_USED, supervisor.used_cpu),
    ]
    .into_iter()
    .map(|(desc, value)| Sample::gauge(desc, &[host], *value))
    .collect()
}

/// Map one entry of `/api/v1/topology/summary`. The returned identity keys
/// the follow-up detail fetch.
pub fn topology_summary(
    topology: &Topology,
) -> Result<(TopologyIdentity, Vec<Sample>), MissingIdentity> {
    let name = non_empty(&topology.name).ok_or(MissingIdentity { field: "name" })?;
    let id = non_empty(&topology.id).ok_or(MissingIdentity { field: "id" })?;
    let identity = TopologyIdentity {
        name: name.to_owned(),
        id: id.to_owned(),
    };

    let labels = identity.labels();
    let samples = [
        (&TOPOLOGY_UPTIME_SECONDS, topology.uptime_seconds),
        (&TOPOLOGY_TASKS_TOTAL, topology.tasks_total),
        (&TOPOLOGY_WORKERS_TOTAL, topology.workers_total),
        (&TOPOLOGY_EXECUTORS_TOTAL, topology.executors_total),
        (&TOPOLOGY_REPLICATION_COUNT, topology.replication_count),
        (&TOPOLOGY_REQUESTED_MEM_ON_HEAP, topology.requested_mem_on_heap),
        (&TOPOLOGY_REQUESTED_MEM_OFF_HEAP, topology.requested_mem_off_heap),
        (&TOPOLOGY_REQUESTED_TOTAL_MEM, topology.requested_total_mem),
        (&TOPOLOGY_REQUESTED_CPU, topology.requested_cpu),
        (&TOPOLOGY_ASSIGNED_MEM_ON_HEAP, topology.assigned_mem_on_heap),
        (&TOPOLOGY_ASSIGNED_MEM_OFF_HEAP, topology.assigned_mem_off_heap),
        (&TOPOLOGY_ASSIGNED_TOTAL_MEM, topology.assigned_total_mem),
        (&TOPOLOGY_ASSIGNED_CPU, topology.assigned_cpu),
    ]
    .into_iter()
    .map(|(desc, value)| Sample::gauge(desc, &labels, *value))
    .collect();

    Ok((identity, samples))
}

/// Map `/api/v1/topology/{id}` for the topology identified by `topology`.
pub fn topology_detail(topology: &TopologyIdentity, detail: &TopologyDetail) -> Vec<Sample> {
    let mut samples = Vec::new();
    for stats in &detail.topology_stats {
        window_stats(topology, stats, &mut samples);
    }
    for worker in &detail.workers {
        self::worker(topology, worker, &mut samples);
    }
    for spout in &detail.spouts {
        self::spout(topology, spout, &mut samples);
    }
    for bolt in &detail.bolts {
        self::bolt(topology, bolt, &mut samples);
    }
    samples
}

fn window_stats(topology: &TopologyIdentity, stats: &WindowStats, out: &mut Vec<Sample>) {
    let Some(window) = non_empty(&stats.window) else {
        warn!(topology = %topology.id, "skipping topology stats without a window");
        return;
    };
    let [name, id] = topology.labels();
    let labels = [name, id, window];
    out.extend(
        [
            (&TOPOLOGY_STATS_TRANSFERRED, stats.transferred),
            (&TOPOLOGY_STATS_EMITTED, stats.emitted),
            (&TOPOLOGY_STATS_COMPLETE_LATENCY, stats.complete_latency),
            (&TOPOLOGY_STATS_ACKED, stats.acked),
            (&TOPOLOGY_STATS_FAILED, stats.failed),
        ]
        .into_iter()
        .map(|(desc, value)| Sample::gauge(desc, &labels, *value)),
    );
}

fn worker(topology: &TopologyIdentity, worker: &Worker, out: &mut Vec<Sample>) {
    let (Some(host), Some(port)) = (non_empty(&worker.host), worker.port) else {
        warn!(topology = %topology.id, "skipping worker without host and port");
        return;
    };
    let port = port.to_string();
    let [name, id] = topology.labels();

    let labels = [name, id, host, port.as_str()];
    out.extend(
        [
            (&WORKER_ASSIGNED_MEM_ON_HEAP, worker.assigned_mem_on_heap),
            (&WORKER_EXECUTORS, worker.executors_total),
            (&WORKER_ASSIGNED_CPU, worker.assigned_cpu),
        ]
        .into_iter()
        .map(|(desc, value)| Sample::gauge(desc, &labels, *value)),
    );

    for (component, tasks) in worker.component_num_tasks.iter().flatten() {
        out.push(Sample::gauge(
            &WORKER_COMPONENT_NUM_TASK,
            &[name, id, host, component.as_str(), port.as_str()],
            **tasks,
        ));
    }
}

fn spout(topology: &TopologyIdentity, spout: &Spout, out: &mut Vec<Sample>) {
    let Some(spout_id) = non_empty(&spout.spout_id) else {
        warn!(topology = %topology.id, "skipping spout without an id");
        return;
    };
    let [name, id] = topology.labels();
    let labels = [name, id, spout_id];
    out.extend(
        [
            (&SPOUTS_EXECUTORS, spout.executors),
            (&SPOUTS_EMITTED, spout.emitted),
            (&SPOUTS_COMPLETE_LATENCY, spout.complete_latency),
            (&SPOUTS_TRANSFERRED, spout.transferred),
            (&SPOUTS_TASKS, spout.tasks),
            (&SPOUTS_ACKED, spout.acked),
            (&SPOUTS_FAILED, spout.failed),
        ]
        .into_iter()
        .map(|(desc, value)| Sample::gauge(desc, &labels, *value)),
    );
}

fn bolt(topology: &TopologyIdentity, bolt: &Bolt, out: &mut Vec<Sample>) {
    let Some(bolt_id) = non_empty(&bolt.bolt_id) else {
        warn!(topology = %topology.id, "skipping bolt without an id");
        return;
    };
    let [name, id] = topology.labels();
    let labels = [name, id, bolt_id];
    out.extend(
        [
            (&BOLTS_PROCESS_LATENCY, bolt.process_latency),
            (&BOLTS_CAPACITY, bolt.capacity),
            (&BOLTS_EXECUTE_LATENCY, bolt.execute_latency),
            (&BOLTS_EXECUTORS, bolt.executors),
            (&BOLTS_TASKS, bolt.tasks),
            (&BOLTS_ACKED, bolt.acked),
            (&BOLTS_FAILED, bolt.failed),
            (&BOLTS_EMITTED, bolt.emitted),
        ]
        .into_iter()
        .map(|(desc, value)| Sample::gauge(desc, &labels, *value)),
    );
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
