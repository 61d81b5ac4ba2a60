//! Error types. Everything the poll loop can die of ends up in a
//! [`CycleError`].

use std::time::Duration;

/// Contract violations against the [`MetricRegistry`] schema. These indicate a
/// bug or an upstream value outside the declared vocabulary, never a transient
/// condition.
///
/// [`MetricRegistry`]: crate::MetricRegistry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("metric `{name}` re-declared with a different schema")]
    SchemaConflict { name: String },

    #[error("metric `{name}` takes {expected} label values, got {got}")]
    LabelArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("metric `{name}` has no state `{state}`")]
    InvalidState { name: String, state: String },

    #[error("metric `{name}` is not declared")]
    UnknownMetric { name: String },

    #[error("metric `{name}` is not a {expected} series")]
    KindMismatch { name: String, expected: &'static str },
}

/// A failed call against the Storm UI API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("GET {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    #[error("GET {path} failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {path} returned HTTP {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("GET {path} returned an undecodable body")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// The API path of the failed call.
    pub fn path(&self) -> &str {
        match self {
            Self::Timeout { path, .. }
            | Self::Transport { path, .. }
            | Self::Status { path, .. }
            | Self::Decode { path, .. } => path,
        }
    }
}

/// A topology summary without the name or id that keys all of its series.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("topology summary has no `{field}`")]
pub struct MissingIdentity {
    pub field: &'static str,
}

/// Anything that ends a poll cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("topology detail task failed")]
    Join(#[from] tokio::task::JoinError),
}

impl CycleError {
    /// Process exit code for this failure: `1` when the upstream API could
    /// not be read, `3` for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Upstream(_) => 1,
            Self::Registry(_) | Self::Join(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_exit_with_one() {
        let err = CycleError::from(UpstreamError::Timeout {
            path: "/api/v1/cluster/summary".into(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("/api/v1/cluster/summary"));
    }

    #[test]
    fn registry_violations_exit_with_three() {
        let err = CycleError::from(RegistryError::InvalidState {
            name: "nimbus_status".into(),
            state: "Offline".into(),
        });
        assert_eq!(err.exit_code(), 3);
    }
}
