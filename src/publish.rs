//! The scrape endpoint. Check the docs for [`init_metrics`].

use crate::MetricRegistry;
use eyre::WrapErr;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};

/// Bind the Prometheus scrape listener on `port` (all interfaces) and return
/// the registry it serves.
///
/// ## How the pieces fit
///
/// [`PrometheusBuilder::build`] hands back two things: a recorder that stores
/// series values, and a future that answers scrape requests by rendering that
/// recorder. We never install the recorder as the process-wide [`metrics`]
/// recorder. Instead it goes into a [`MetricRegistry`], which the poll loop
/// writes through, while the listener task reads the same cells.
///
/// The listener lives as long as the tokio runtime. It is independent of the
/// poll loop: if polling dies the last values stay scrapeable until the
/// process exits.
///
/// Every request is answered with the full registry, so both
/// `curl http://localhost:9800/` and `curl http://localhost:9800/metrics` work.
pub fn init_metrics(port: u16) -> eyre::Result<Arc<MetricRegistry>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let (recorder, listener) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .build()
        .wrap_err_with(|| format!("failed to start the metrics listener on {addr}"))?;

    let registry = MetricRegistry::with_catalog(recorder).wrap_err("invalid metric catalog")?;

    tokio::spawn(async move {
        if let Err(err) = listener.await {
            error!(?err, "metrics listener exited");
        }
    });
    info!(%addr, "serving metrics");

    Ok(Arc::new(registry))
}
