//! The poll loop. This module contains the [`Poller`] struct.

use crate::{
    CycleError, MetricRegistry, StormClient,
    extract::{self, TopologyIdentity},
};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{task::JoinSet, time::Instant};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

/// What one successful cycle saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub supervisors: usize,
    pub nimbuses: usize,
    pub topologies: usize,

    /// Topologies skipped because their summary had no name or id.
    pub skipped_topologies: usize,

    pub elapsed: Duration,
}

/// Polls the Storm UI at a fixed interval and writes what it finds into the
/// [`MetricRegistry`].
///
/// The interval is measured from the end of one cycle to the start of the
/// next, so the real period is `interval` plus however long the cycle took.
pub struct Poller {
    client: StormClient,
    registry: Arc<MetricRegistry>,
    interval: Duration,
    detail_concurrency: usize,
}

impl Poller {
    /// Create a poller that fetches topology details one at a time.
    pub fn new(client: StormClient, registry: Arc<MetricRegistry>, interval: Duration) -> Self {
        Self {
            client,
            registry,
            interval,
            detail_concurrency: 1,
        }
    }

    /// Fetch up to `n` topology details at once. `0` is treated as `1`.
    pub fn with_detail_concurrency(mut self, n: usize) -> Self {
        self.detail_concurrency = n.max(1);
        self
    }

    /// Run one cycle: supervisors, nimbuses, cluster, then each topology
    /// summary followed by its detail. Any failed fetch fails the whole cycle; whatever was
    /// written before the failure stays in the registry.
    pub async fn poll_once(&self) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let mut report = CycleReport::default();

        let supervisors = self.client.supervisor_summary().await?;
        self.registry.apply(&extract::supervisors(&supervisors))?;
        report.supervisors = supervisors.supervisors.len();

        let nimbuses = self.client.nimbus_summary().await?;
        self.registry.apply(&extract::nimbuses(&nimbuses))?;
        report.nimbuses = nimbuses.nimbuses.len();

        let cluster = self.client.cluster_summary().await?;
        self.registry.apply(&extract::cluster(&cluster))?;

        // Sequential: summary(A), detail(A), summary(B), ...
        // Concurrent: every summary, then the details fanned out.
        let sequential = self.detail_concurrency == 1;
        let topologies = self.client.topology_summary().await?;
        let mut accepted = Vec::with_capacity(topologies.topologies.len());
        for topology in &topologies.topologies {
            match extract::topology_summary(topology) {
                Ok((identity, samples)) => {
                    self.registry.apply(&samples)?;
                    if sequential {
                        publish_detail(&self.client, &self.registry, &identity).await?;
                    }
                    accepted.push(identity);
                }
                Err(err) => {
                    warn!(%err, name = ?topology.name, "skipping topology");
                    report.skipped_topologies += 1;
                }
            }
        }
        report.topologies = accepted.len();

        if !sequential {
            self.publish_details_concurrently(accepted).await?;
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Fan the detail fetches out over at most `detail_concurrency` tasks.
    /// Distinct topologies never share a series, so the tasks never write the
    /// same cell. Dropping the [`JoinSet`] on the first error aborts the rest.
    async fn publish_details_concurrently(
        &self,
        topologies: Vec<TopologyIdentity>,
    ) -> Result<(), CycleError> {
        let mut pending = topologies.into_iter();
        let mut tasks = JoinSet::new();

        loop {
            while tasks.len() < self.detail_concurrency {
                let Some(identity) = pending.next() else {
                    break;
                };
                let client = self.client.clone();
                let registry = Arc::clone(&self.registry);
                tasks.spawn(
                    async move { publish_detail(&client, &registry, &identity).await }
                        .in_current_span(),
                );
            }

            match tasks.join_next().await {
                Some(joined) => joined??,
                None => return Ok(()),
            }
        }
    }

    /// Poll forever, or until `shutdown` resolves. An in-flight cycle is
    /// dropped on shutdown, which aborts its pending requests.
    ///
    /// Returns the error of the first failed cycle. Nothing is retried: a
    /// process supervisor is expected to restart the exporter.
    pub async fn run<F>(self, shutdown: F) -> Result<(), CycleError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycle: u64 = 0;

        loop {
            let span = info_span!("poll_cycle", cycle);

            tokio::select! {
                res = self.poll_once().instrument(span.clone()) => {
                    let report = res?;
                    span.in_scope(|| {
                        info!(
                            supervisors = report.supervisors,
                            nimbuses = report.nimbuses,
                            topologies = report.topologies,
                            skipped_topologies = report.skipped_topologies,
                            elapsed_ms = report.elapsed.as_millis() as u64,
                            "caught metrics"
                        );
                    });
                }
                () = &mut shutdown => {
                    info!(cycle, "shutdown requested during poll cycle");
                    return Ok(());
                }
            }

            cycle = cycle.wrapping_add(1);

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = &mut shutdown => {
                    info!("shutdown requested");
                    return Ok(());
                }
            }
        }
    }
}

#[instrument(skip(client, registry, topology), fields(topology = %topology.id))]
async fn publish_detail(
    client: &StormClient,
    registry: &MetricRegistry,
    topology: &TopologyIdentity,
) -> Result<(), CycleError> {
    let detail = client.topology_detail(&topology.id).await?;
    let samples = extract::topology_detail(topology, &detail);
    debug!(samples = samples.len(), "publishing topology detail");
    registry.apply(&samples)?;
    Ok(())
}
