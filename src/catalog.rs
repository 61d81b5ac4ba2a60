//! Declarations of every series the exporter publishes.
//!
//! Names, help text and label keys match what existing Storm dashboards
//! query, so they are kept exactly as they have always been exported
//! (including `topology_stats_trasferred`).

/// The kind of a declared series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A plain numeric gauge.
    Gauge,

    /// A categorical series. Exactly one of the listed states is active at a
    /// time.
    State(&'static [&'static str]),
}

/// A series identity: name, help, label schema and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
    pub kind: MetricKind,
}

impl MetricDesc {
    pub const fn gauge(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            labels,
            kind: MetricKind::Gauge,
        }
    }

    pub const fn state(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
        states: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            labels,
            kind: MetricKind::State(states),
        }
    }
}

const CLUSTER: &[&str] = &[];
const NIMBUS: &[&str] = &["Nimbus"];
const SUPERVISOR: &[&str] = &["Supervisor"];
const TOPOLOGY: &[&str] = &["TopologyName", "TopologyId"];
const TOPOLOGY_WINDOW: &[&str] = &["TopologyName", "TopologyId", "window"];
const WORKER: &[&str] = &["TopologyName", "TopologyId", "Supervisor", "Port"];
const WORKER_COMPONENT: &[&str] = &["TopologyName", "TopologyId", "Supervisor", "BoltId", "Port"];
const SPOUT: &[&str] = &["TopologyName", "TopologyId", "SpoutId"];
const BOLT: &[&str] = &["TopologyName", "TopologyId", "BoltId"];

/// States reported by `/api/v1/nimbus/summary`.
pub const NIMBUS_STATES: &[&str] = &["Leader", "Not a Leader", "Dead"];

// cluster/summary
pub const CLUSTER_SUPERVISORS_TOTAL: MetricDesc = MetricDesc::gauge(
    "cluster_supervisor_total",
    "Number of supervisors running",
    CLUSTER,
);
pub const CLUSTER_TOPOLOGIES_TOTAL: MetricDesc = MetricDesc::gauge(
    "cluster_topology_total",
    "Number of topologies running",
    CLUSTER,
);
pub const CLUSTER_TOTAL_WORKER_SLOTS: MetricDesc = MetricDesc::gauge(
    "cluster_total_worker_slots",
    "Total number of total worker slots",
    CLUSTER,
);
pub const CLUSTER_USED_WORKER_SLOTS: MetricDesc = MetricDesc::gauge(
    "cluster_used_worker_slots",
    "Total number of used worker slots",
    CLUSTER,
);
pub const CLUSTER_FREE_WORKER_SLOTS: MetricDesc = MetricDesc::gauge(
    "cluster_free_worker_slots",
    "Total number of free worker slots",
    CLUSTER,
);
pub const CLUSTER_EXECUTORS_TOTAL: MetricDesc = MetricDesc::gauge(
    "cluster_executor_total",
    "Total number of executors",
    CLUSTER,
);
pub const CLUSTER_TASKS_TOTAL: MetricDesc =
    MetricDesc::gauge("cluster_task_total", "Total number of tasks", CLUSTER);
pub const CLUSTER_MEM_TOTAL: MetricDesc = MetricDesc::gauge(
    "cluster_mem_total",
    "The total amount of memory in the cluster in MB",
    CLUSTER,
);
pub const CLUSTER_MEM_AVAIL: MetricDesc = MetricDesc::gauge(
    "cluster_mem_avail",
    "The amount of available memory in the cluster in MB",
    CLUSTER,
);
pub const CLUSTER_MEM_ASSIGNED_PERCENT_UTIL: MetricDesc = MetricDesc::gauge(
    "cluster_mem_assigned_per_util",
    "The percent utilization of assigned memory resources in cluster",
    CLUSTER,
);
pub const CLUSTER_CPU_TOTAL: MetricDesc = MetricDesc::gauge(
    "cluster_cpu_total",
    "The total amount of CPU in the cluster",
    CLUSTER,
);
pub const CLUSTER_CPU_AVAIL: MetricDesc = MetricDesc::gauge(
    "cluster_cpu_avail",
    "The amount of available CPU in the cluster",
    CLUSTER,
);
pub const CLUSTER_CPU_ASSIGNED_PERCENT_UTIL: MetricDesc = MetricDesc::gauge(
    "cluster_cpu_assigned_per_util",
    "The percent utilization of assigned CPU resources in cluster",
    CLUSTER,
);

// nimbus/summary
pub const NIMBUS_STATUS: MetricDesc = MetricDesc::state(
    "nimbus_status",
    "Nimbus Status, Possible values are Leader, Not a Leader, Dead",
    NIMBUS,
    NIMBUS_STATES,
);

// supervisor/summary
pub const SUPERVISOR_UPTIME_SECOND: MetricDesc = MetricDesc::gauge(
    "supervisor_uptime_second",
    "Shows how long the supervisor is running in seconds",
    SUPERVISOR,
);
pub const SUPERVISOR_SLOTS_TOTAL: MetricDesc = MetricDesc::gauge(
    "supervisor_slots_total",
    "Total number of available worker slots for this supervisor",
    SUPERVISOR,
);
pub const SUPERVISOR_SLOTS_USED: MetricDesc = MetricDesc::gauge(
    "supervisor_slots_used",
    "Number of worker slots used on this supervisor",
    SUPERVISOR,
);
pub const SUPERVISOR_MEM_TOTAL: MetricDesc = MetricDesc::gauge(
    "supervisor_memory_total",
    "Total memory capacity on this supervisor",
    SUPERVISOR,
);
pub const SUPERVISOR_MEM_USED: MetricDesc = MetricDesc::gauge(
    "supervisor_memory_used",
    "Used memory capacity on this supervisor",
    SUPERVISOR,
);
pub const SUPERVISOR_CPU_TOTAL: MetricDesc = MetricDesc::gauge(
    "supervisor_cpu_total",
    "Total CPU capacity on this supervisor",
    SUPERVISOR,
);
pub const SUPERVISOR_CPU_USED: MetricDesc = MetricDesc::gauge(
    "supervisor_cpu_used",
    "Used CPU capacity on this supervisor",
    SUPERVISOR,
);

// topology/summary
pub const TOPOLOGY_UPTIME_SECONDS: MetricDesc = MetricDesc::gauge(
    "uptime_seconds",
    "Shows how long the topology is running in seconds",
    TOPOLOGY,
);
pub const TOPOLOGY_TASKS_TOTAL: MetricDesc = MetricDesc::gauge(
    "tasks_total",
    "Total number of tasks for this topology",
    TOPOLOGY,
);
pub const TOPOLOGY_WORKERS_TOTAL: MetricDesc = MetricDesc::gauge(
    "workers_total",
    "Number of workers used for this topology",
    TOPOLOGY,
);
pub const TOPOLOGY_EXECUTORS_TOTAL: MetricDesc = MetricDesc::gauge(
    "executors_total",
    "Number of executors used for this topology",
    TOPOLOGY,
);
pub const TOPOLOGY_REPLICATION_COUNT: MetricDesc = MetricDesc::gauge(
    "replication_count",
    "Number of nimbus hosts on which this topology code is replicated",
    TOPOLOGY,
);
pub const TOPOLOGY_REQUESTED_MEM_ON_HEAP: MetricDesc = MetricDesc::gauge(
    "requested_mem_on_heap",
    "Requested On-Heap Memory by User (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_REQUESTED_MEM_OFF_HEAP: MetricDesc = MetricDesc::gauge(
    "requested_mem_off_heap",
    "Requested Off-Heap Memory by User (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_REQUESTED_TOTAL_MEM: MetricDesc = MetricDesc::gauge(
    "requested_total_mem",
    "Requested Total Memory by User (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_REQUESTED_CPU: MetricDesc =
    MetricDesc::gauge("requested_cpu", "Requested CPU by User (%)", TOPOLOGY);
pub const TOPOLOGY_ASSIGNED_MEM_ON_HEAP: MetricDesc = MetricDesc::gauge(
    "assigned_mem_on_heap",
    "Assigned On-Heap Memory by Scheduler (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_ASSIGNED_MEM_OFF_HEAP: MetricDesc = MetricDesc::gauge(
    "assigned_mem_off_heap",
    "Assigned Off-Heap Memory by Scheduler (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_ASSIGNED_TOTAL_MEM: MetricDesc = MetricDesc::gauge(
    "assigned_total_mem",
    "Assigned Total Memory by Scheduler (MB)",
    TOPOLOGY,
);
pub const TOPOLOGY_ASSIGNED_CPU: MetricDesc =
    MetricDesc::gauge("assigned_cpu", "Assigned CPU by Scheduler (%)", TOPOLOGY);

// topology/{id} topologyStats
pub const TOPOLOGY_STATS_TRANSFERRED: MetricDesc = MetricDesc::gauge(
    "topology_stats_trasferred",
    "Number messages transferred in given window",
    TOPOLOGY_WINDOW,
);
pub const TOPOLOGY_STATS_EMITTED: MetricDesc = MetricDesc::gauge(
    "topology_stats_emitted",
    "Number of messages emitted in given window",
    TOPOLOGY_WINDOW,
);
pub const TOPOLOGY_STATS_COMPLETE_LATENCY: MetricDesc = MetricDesc::gauge(
    "topology_stats_complete_latency",
    "Total latency for processing the message",
    TOPOLOGY_WINDOW,
);
pub const TOPOLOGY_STATS_ACKED: MetricDesc = MetricDesc::gauge(
    "topology_stats_acked",
    "Number of messages acked in given window",
    TOPOLOGY_WINDOW,
);
pub const TOPOLOGY_STATS_FAILED: MetricDesc = MetricDesc::gauge(
    "topology_stats_failed",
    "Number of messages failed in given window",
    TOPOLOGY_WINDOW,
);

// topology/{id} workers
pub const WORKER_ASSIGNED_MEM_ON_HEAP: MetricDesc = MetricDesc::gauge(
    "worker_mem_assigned_on_heap",
    "Assigned On-Heap Memory by Scheduler (MB)",
    WORKER,
);
pub const WORKER_EXECUTORS: MetricDesc = MetricDesc::gauge(
    "worker_executors",
    "Number of executors used by the topology in this worker",
    WORKER,
);
pub const WORKER_ASSIGNED_CPU: MetricDesc =
    MetricDesc::gauge("worker_cpu_assigned_on_heap", "Assigned CPU", WORKER);
pub const WORKER_COMPONENT_NUM_TASK: MetricDesc = MetricDesc::gauge(
    "worker_component_num_task",
    "Components -> # of executing tasks",
    WORKER_COMPONENT,
);

// topology/{id} spouts
pub const SPOUTS_EXECUTORS: MetricDesc = MetricDesc::gauge(
    "spouts_executors",
    "Number of executors for the spout",
    SPOUT,
);
pub const SPOUTS_EMITTED: MetricDesc = MetricDesc::gauge(
    "spouts_emitted",
    "Number of messages emitted in given window",
    SPOUT,
);
pub const SPOUTS_COMPLETE_LATENCY: MetricDesc = MetricDesc::gauge(
    "spouts_complete_latency",
    "Total latency for processing the message",
    SPOUT,
);
pub const SPOUTS_TRANSFERRED: MetricDesc = MetricDesc::gauge(
    "spouts_transferred",
    "Total number of messages transferred in given window",
    SPOUT,
);
pub const SPOUTS_TASKS: MetricDesc = MetricDesc::gauge(
    "spouts_tasks",
    "Total number of tasks for the spout",
    SPOUT,
);
pub const SPOUTS_ACKED: MetricDesc =
    MetricDesc::gauge("spouts_acked", "Number of messages acked", SPOUT);
pub const SPOUTS_FAILED: MetricDesc =
    MetricDesc::gauge("spouts_failed", "Number of messages failed", SPOUT);

// topology/{id} bolts
pub const BOLTS_PROCESS_LATENCY: MetricDesc = MetricDesc::gauge(
    "bolts_process_latency",
    "Average time of the bolt to ack a message after it was received",
    BOLT,
);
pub const BOLTS_CAPACITY: MetricDesc = MetricDesc::gauge(
    "bolts_capacity",
    "This value indicates number of messages executed * average execute latency / time window",
    BOLT,
);
pub const BOLTS_EXECUTE_LATENCY: MetricDesc = MetricDesc::gauge(
    "bolts_execute_latency",
    "Average time to run the execute method of the bolt",
    BOLT,
);
pub const BOLTS_EXECUTORS: MetricDesc = MetricDesc::gauge(
    "bolts_executors",
    "Number of executor tasks in the bolt component",
    BOLT,
);
pub const BOLTS_TASKS: MetricDesc =
    MetricDesc::gauge("bolts_tasks", "Number of instances of bolt", BOLT);
pub const BOLTS_ACKED: MetricDesc =
    MetricDesc::gauge("bolts_acked", "Number of tuples acked by the bolt", BOLT);
pub const BOLTS_FAILED: MetricDesc =
    MetricDesc::gauge("bolts_failed", "Number of tuples failed by the bolt", BOLT);
pub const BOLTS_EMITTED: MetricDesc =
    MetricDesc::gauge("bolts_emitted", "of tuples emitted by the bolt", BOLT);

/// Every series the exporter publishes.
pub const ALL: &[MetricDesc] = &[
    CLUSTER_SUPERVISORS_TOTAL,
    CLUSTER_TOPOLOGIES_TOTAL,
    CLUSTER_TOTAL_WORKER_SLOTS,
    CLUSTER_USED_WORKER_SLOTS,
    CLUSTER_FREE_WORKER_SLOTS,
    CLUSTER_EXECUTORS_TOTAL,
    CLUSTER_TASKS_TOTAL,
    CLUSTER_MEM_TOTAL,
    CLUSTER_MEM_AVAIL,
    CLUSTER_MEM_ASSIGNED_PERCENT_UTIL,
    CLUSTER_CPU_TOTAL,
    CLUSTER_CPU_AVAIL,
    CLUSTER_CPU_ASSIGNED_PERCENT_UTIL,
    NIMBUS_STATUS,
    SUPERVISOR_UPTIME_SECOND,
    SUPERVISOR_SLOTS_TOTAL,
    SUPERVISOR_SLOTS_USED,
    SUPERVISOR_MEM_TOTAL,
    SUPERVISOR_MEM_USED,
    SUPERVISOR_CPU_TOTAL,
    SUPERVISOR_CPU_USED,
    TOPOLOGY_UPTIME_SECONDS,
    TOPOLOGY_TASKS_TOTAL,
    TOPOLOGY_WORKERS_TOTAL,
    TOPOLOGY_EXECUTORS_TOTAL,
    TOPOLOGY_REPLICATION_COUNT,
    TOPOLOGY_REQUESTED_MEM_ON_HEAP,
    TOPOLOGY_REQUESTED_MEM_OFF_HEAP,
    TOPOLOGY_REQUESTED_TOTAL_MEM,
    TOPOLOGY_REQUESTED_CPU,
    TOPOLOGY_ASSIGNED_MEM_ON_HEAP,
    TOPOLOGY_ASSIGNED_MEM_OFF_HEAP,
    TOPOLOGY_ASSIGNED_TOTAL_MEM,
    TOPOLOGY_ASSIGNED_CPU,
    TOPOLOGY_STATS_TRANSFERRED,
    TOPOLOGY_STATS_EMITTED,
    TOPOLOGY_STATS_COMPLETE_LATENCY,
    TOPOLOGY_STATS_ACKED,
    TOPOLOGY_STATS_FAILED,
    WORKER_ASSIGNED_MEM_ON_HEAP,
    WORKER_EXECUTORS,
    WORKER_ASSIGNED_CPU,
    WORKER_COMPONENT_NUM_TASK,
    SPOUTS_EXECUTORS,
    SPOUTS_EMITTED,
    SPOUTS_COMPLETE_LATENCY,
    SPOUTS_TRANSFERRED,
    SPOUTS_TASKS,
    SPOUTS_ACKED,
    SPOUTS_FAILED,
    BOLTS_PROCESS_LATENCY,
    BOLTS_CAPACITY,
    BOLTS_EXECUTE_LATENCY,
    BOLTS_EXECUTORS,
    BOLTS_TASKS,
    BOLTS_ACKED,
    BOLTS_FAILED,
    BOLTS_EMITTED,
];
