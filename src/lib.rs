//! Apache Storm metrics exporter.
//!
//! This crate polls the Storm UI REST API at a fixed interval and republishes
//! what it finds as Prometheus metrics: cluster capacity, nimbus leadership,
//! supervisor slots and resources, and per-topology throughput, latency and
//! failure counts down to individual workers, spouts and bolts.
//!
//! Data flows one way, once per cycle:
//!
//! ```text
//! Poller ──▶ StormClient ──▶ extract ──▶ MetricRegistry ◀── scrape listener
//! ```
//!
//! - The [`Poller`] owns the loop and the order of the calls.
//! - The [`StormClient`] performs one GET per call and decodes it into the
//!   typed documents of [`model`].
//! - The [`extract`] functions turn a document into [`Sample`]s. They never
//!   do I/O, which keeps them easy to test.
//! - The [`MetricRegistry`] holds the declared series of the [`catalog`] and
//!   is shared with the scrape listener started by [`init_metrics`].
//!
//! Any failed call ends the loop with a [`CycleError`]. The binary turns that
//! into a non-zero exit and leaves restarting to the process supervisor.
//! Series are never evicted, so a host or topology that disappears keeps its
//! last values until the exporter restarts.

pub mod catalog;

mod cli;
pub use cli::CmdArgs;

mod error;
pub use error::{CycleError, MissingIdentity, RegistryError, UpstreamError};

pub mod extract;

pub mod model;

mod publish;
pub use publish::init_metrics;

mod registry;
pub use registry::{MetricRegistry, Sample, SampleValue};

mod scheduler;
pub use scheduler::{CycleReport, Poller};

mod trace;
pub use trace::{OTLP_ENDPOINT_ENV, TracingGuard, init_tracing};

pub mod upstream;
pub use upstream::StormClient;
