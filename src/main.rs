use clap::{Parser, error::ErrorKind};
use eyre::WrapErr;
use std::process::ExitCode;
use storm_exporter::{CmdArgs, CycleError, Poller, StormClient, init_metrics, init_tracing};
use tracing::{error, info};

const EXIT_USAGE: u8 = 2;
const EXIT_FATAL: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match CmdArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    let _guard = match init_tracing(args.log_json) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize tracing: {err:?}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            error!(err = ?report, "exporter stopped");
            eprintln!("Error: {report:?}");
            let code = report
                .downcast_ref::<CycleError>()
                .map_or(EXIT_FATAL, CycleError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(args: CmdArgs) -> eyre::Result<()> {
    let registry = init_metrics(args.http_port)?;
    let client = StormClient::new(&args.storm_ui_host, args.timeout())
        .wrap_err("failed to build the Storm UI client")?;

    info!(
        storm_ui = client.base_url(),
        refresh_seconds = args.refresh_seconds,
        detail_concurrency = args.detail_concurrency,
        "polling"
    );

    Poller::new(client, registry, args.refresh())
        .with_detail_concurrency(args.detail_concurrency as usize)
        .run(shutdown_signal())
        .await?;

    info!("exporter stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
