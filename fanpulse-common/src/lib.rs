//! # FanPulse Common Library
//!
//! Shared code for the FanPulse ingest pipeline including:
//! - Post and attribution data model
//! - Configuration loading (TOML + environment + compiled defaults)
//! - Lenient numeric coercion for exported counters
//! - Date parsing and year-month bucketing

pub mod config;
pub mod error;
pub mod models;
pub mod numeric;
pub mod text;
pub mod time;

pub use error::{Error, Result};
pub use models::{Artist, Attribution, AttributedPost, Counters, MatchMethod, Platform, RawPost};
