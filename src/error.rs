// src/error.rs
// Typed failure taxonomy so callers can tell "degrade and continue" from
// "abort the run" without string-matching log output.

use std::fmt;
use thiserror::Error;

/// Failures surfaced by a `DocumentStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("http transport error")]
    Transport(#[from] reqwest::Error),

    #[error("malformed store document")]
    Malformed(#[from] serde_json::Error),

    #[error("store rejected request: {0}")]
    Rejected(String),
}

/// The pipeline stage a `StageFailed` is attributed to. Unify is the only
/// stage with a hard dependency; normalization and scoring are total, a
/// failed topic fit degrades to default topic fields, and store-write
/// failures surface as `PipelineError::Store`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Unify => write!(f, "unify"),
        }
    }
}

/// Run-level error taxonomy.
///
/// `Connectivity` is fatal for the whole run. `StageFailed` aborts only the
/// enrichment stage; the surrounding binary logs it and exits cleanly.
/// An insufficient topic-model corpus is a skip condition, not an error,
/// and never appears here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("store connectivity failure")]
    Connectivity(#[source] StoreError),

    #[error("stage `{stage}` failed: {reason}")]
    StageFailed { stage: Stage, reason: String },

    #[error("store write failed")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// True when the whole run must abort (nothing downstream can proceed).
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Connectivity(_))
    }
}
