//! Artist attribution
//!
//! Decides which roster artist, if any, a free-text caption refers to:
//! - `mentions`: pulls `@handle` tokens out of captions
//! - `overrides`: curated fragment → artist corrections
//! - `strategies`: the individual matching rules, cheapest and most precise first
//! - `matcher`: runs the strategy cascade and applies the override correction pass

pub mod matcher;
pub mod mentions;
pub mod overrides;
pub mod strategies;

pub use fanpulse_common::text::normalize;
pub use matcher::ArtistMatcher;
pub use mentions::extract_mentions;
pub use overrides::{OverrideRule, OverrideTable};
pub use strategies::{Candidate, Caption, MatchContext, MatchStrategy};
