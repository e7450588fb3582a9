//! Error types for fanpulse-ingest
//!
//! Only run-level problems are errors. Per-record problems (bad counters,
//! undated posts, captions with no artist) are absorbed by the pipeline and
//! reported as summary counts.

use fanpulse_common::Platform;
use std::path::PathBuf;
use thiserror::Error;

/// Ingest error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Roster file produced no artists
    #[error("Roster is empty: {0}")]
    EmptyRoster(PathBuf),

    /// An input dataset is missing or unreadable
    #[error("Dataset not found for {platform}: {path}")]
    MissingDataset { platform: Platform, path: PathBuf },

    /// No dataset was supplied at all
    #[error("No input datasets supplied")]
    NoDatasets,

    /// Config names a platform that has no row mapping
    #[error("Unknown platform in config: {0}")]
    UnknownPlatform(String),

    /// Dataset file is not a JSON array of row objects
    #[error("Invalid dataset {path}: {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// fanpulse-common error
    #[error("Common error: {0}")]
    Common(#[from] fanpulse_common::Error),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
