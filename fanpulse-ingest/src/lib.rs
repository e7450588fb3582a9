//! fanpulse-ingest library interface
//!
//! Attributes social-media posts to roster artists and rolls their
//! engagement up into monthly and per-artist statistics.
//!
//! Flow: `records` maps export rows to posts, `matching` attributes each
//! post, `engagement` scores it, `aggregation` buckets the results and
//! `export` writes the dashboard documents. `batch` wires the steps
//! together for the CLI.

pub mod aggregation;
pub mod batch;
pub mod engagement;
pub mod error;
pub mod export;
pub mod matching;
pub mod pipeline;
pub mod records;
pub mod roster;

pub use crate::error::{IngestError, IngestResult};
pub use crate::matching::{ArtistMatcher, OverrideTable};
pub use crate::pipeline::{Pipeline, PlatformRun, RunSummary};
pub use crate::roster::Roster;
