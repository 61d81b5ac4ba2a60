use clap::Parser;
use std::time::Duration;

/// Export Apache Storm UI stats as Prometheus metrics.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about)]
pub struct CmdArgs {
    /// Storm UI address, `host[:port]` without a scheme
    pub storm_ui_host: String,

    /// Port to serve metrics on
    pub http_port: u16,

    /// Seconds to wait between the end of one poll and the start of the next
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_seconds: u64,

    /// Timeout for each Storm UI request, in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_seconds: u64,

    /// How many topology details to fetch at once
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub detail_concurrency: u64,

    /// Log as JSON lines instead of text
    #[arg(long)]
    pub log_json: bool,
}

impl CmdArgs {
    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
