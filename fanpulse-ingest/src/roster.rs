//! Artist roster
//!
//! The ordered, de-duplicated list of artists eligible for attribution.
//! Order matters: matching strategies scan the roster front to back and the
//! first artist to satisfy a rule wins.

use crate::error::{IngestError, IngestResult};
use crate::matching::OverrideTable;
use fanpulse_common::Artist;
use std::path::Path;
use tracing::{debug, info};

/// Header line written by the spreadsheet export
const HEADER_LINE: &str = "main_artist";

#[derive(Debug, Clone, Default)]
pub struct Roster {
    artists: Vec<Artist>,
}

impl Roster {
    /// Build from display names, dropping blanks and duplicates (first wins)
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::default();
        for name in names {
            roster.push(name.as_ref());
        }
        roster
    }

    /// Parse a one-artist-per-line roster export.
    ///
    /// Lines are trimmed and stripped of surrounding double quotes; blank lines
    /// and the `main_artist` header are skipped.
    pub fn from_lines(text: &str) -> Self {
        Self::from_names(
            text.lines()
                .map(|line| line.trim().trim_matches('"').trim())
                .filter(|line| !line.is_empty() && *line != HEADER_LINE),
        )
    }

    /// Load a roster file; an empty roster aborts the run
    pub fn load(path: &Path) -> IngestResult<Self> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let roster = Self::from_lines(&text);

        if roster.is_empty() {
            return Err(IngestError::EmptyRoster(path.to_path_buf()));
        }

        info!(path = %path.display(), artists = roster.len(), "Loaded roster");
        Ok(roster)
    }

    /// Roster with every override target appended (if missing), so overrides
    /// can only ever produce roster members
    pub fn with_override_targets(mut self, overrides: &OverrideTable) -> Self {
        for target in overrides.targets() {
            if !self.contains(target) {
                debug!(artist = %target, "Adding override target to roster");
                self.artists.push(target.clone());
            }
        }
        self
    }

    fn push(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let artist = Artist::new(name);
        if artist.key().is_empty() || self.contains(&artist) {
            return;
        }
        self.artists.push(artist);
    }

    pub fn contains(&self, artist: &Artist) -> bool {
        self.artists.iter().any(|a| a == artist)
    }

    /// Look up a roster artist by any spelling that normalizes the same way
    pub fn get(&self, name: &str) -> Option<&Artist> {
        let wanted = Artist::new(name);
        self.artists.iter().find(|a| **a == wanted)
    }

    /// The roster's own entry for `artist`, so output always carries the
    /// roster spelling; `artist` itself when it is not a member
    pub fn canonical<'a>(&'a self, artist: &'a Artist) -> &'a Artist {
        self.artists.iter().find(|a| *a == artist).unwrap_or(artist)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artist> {
        self.artists.iter()
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }
}
