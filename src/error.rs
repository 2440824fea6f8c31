//! Error types for loading, aggregation and configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::comparison::scenario::ScenarioIdentity;

/// Outcome of a trajectory load that did not produce a trajectory
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("trajectory log not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("trajectory log unreadable: {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed trajectory log {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    /// True when the data is absent or unreadable rather than corrupt
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Unreadable { .. })
    }

    pub fn kind(&self) -> FailureKind {
        if self.is_unavailable() {
            FailureKind::Unavailable
        } else {
            FailureKind::Malformed
        }
    }
}

/// Numeric corruption detected in aggregated totals
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("non-finite total for {metric}: {value}")]
    NonFinite { metric: &'static str, value: f64 },
}

/// Invalid analysis setup, detected before anything is loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate scenario identity: {0}")]
    DuplicateScenario(ScenarioIdentity),

    #[error("invalid uncertainty scale {0}: must be finite and non-negative")]
    InvalidScale(f64),

    #[error("locator template has no {{scale}} placeholder: {0}")]
    MissingPlaceholder(String),

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a scenario did not contribute metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unavailable,
    Malformed,
    NonFinite,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unavailable => "unavailable",
            Self::Malformed => "malformed",
            Self::NonFinite => "non-finite",
        };
        f.write_str(s)
    }
}
