//! Platform row mapping
//!
//! Platform exports arrive as JSON arrays of flat row objects whose column
//! names differ per platform (and per export language). A `ColumnMapping`
//! lists candidate columns for each logical field; the first column that is
//! present and non-empty wins.
//!
//! Bad cells never fail a row. Unparseable counters become 0 and are counted
//! in `MappedRow::malformed_fields`; unparseable dates leave the post undated.

use crate::error::{IngestError, IngestResult};
use fanpulse_common::config::{ColumnOverrides, TomlConfig};
use fanpulse_common::numeric::{coerce_u64, Coerced};
use fanpulse_common::time::parse_post_date;
use fanpulse_common::{Counters, Platform, RawPost};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// One export row
pub type Row = Map<String, Value>;

/// Candidate column names per logical field, in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pub date: Vec<String>,
    pub description: Vec<String>,
    pub views: Vec<String>,
    pub likes: Vec<String>,
    pub comments: Vec<String>,
    pub shares: Vec<String>,
    pub collects: Vec<String>,
    pub permalink: Vec<String>,
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl ColumnMapping {
    /// Built-in column names for a platform's standard export
    pub fn preset(platform: Platform) -> Self {
        match platform {
            Platform::TikTok => Self {
                date: columns(&["publish_date", "date"]),
                description: columns(&["description"]),
                views: columns(&["views", "plays"]),
                likes: columns(&["likes"]),
                comments: columns(&["comments"]),
                shares: columns(&["shares"]),
                collects: columns(&["collects"]),
                permalink: columns(&["video_url", "video_id"]),
            },
            Platform::Instagram => Self {
                date: columns(&["date"]),
                description: columns(&["Descripción", "Description"]),
                views: columns(&["Visualizaciones", "Alcance"]),
                likes: columns(&["Me gusta"]),
                comments: columns(&["Comentarios"]),
                shares: columns(&["Veces que se compartió"]),
                collects: columns(&["Veces que se guardó"]),
                permalink: columns(&["Enlace permanente"]),
            },
        }
    }

    /// Replace every field the overrides set; unset fields keep their columns
    pub fn apply_overrides(mut self, overrides: &ColumnOverrides) -> Self {
        let fields: [(&mut Vec<String>, &Option<Vec<String>>); 8] = [
            (&mut self.date, &overrides.date),
            (&mut self.description, &overrides.description),
            (&mut self.views, &overrides.views),
            (&mut self.likes, &overrides.likes),
            (&mut self.comments, &overrides.comments),
            (&mut self.shares, &overrides.shares),
            (&mut self.collects, &overrides.collects),
            (&mut self.permalink, &overrides.permalink),
        ];
        for (field, replacement) in fields {
            if let Some(names) = replacement {
                *field = names.clone();
            }
        }
        self
    }
}

/// A mapped row plus the per-row problems found while mapping it
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub post: RawPost,
    /// Counter cells that were present but not valid non-negative numbers
    pub malformed_fields: usize,
}

impl MappedRow {
    pub fn missing_date(&self) -> bool {
        self.post.date.is_none()
    }
}

/// Turns export rows of one platform into `RawPost`s
#[derive(Debug, Clone)]
pub struct RowMapper {
    platform: Platform,
    mapping: ColumnMapping,
}

impl RowMapper {
    pub fn new(platform: Platform, mapping: ColumnMapping) -> Self {
        Self { platform, mapping }
    }

    /// Mapper using the built-in preset
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform, ColumnMapping::preset(platform))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// Map one row
    pub fn map_row(&self, row: &Row) -> MappedRow {
        let mut malformed_fields = 0usize;
        let mut counter = |names: &[String], field: &'static str| -> u64 {
            match coerce_u64(first_present(row, names)) {
                Coerced::Present(v) => v,
                Coerced::Missing => 0,
                Coerced::Malformed => {
                    malformed_fields += 1;
                    debug!(field, "Malformed numeric cell, using 0");
                    0
                }
            }
        };

        let counters = Counters {
            views: counter(&self.mapping.views, "views"),
            likes: counter(&self.mapping.likes, "likes"),
            comments: counter(&self.mapping.comments, "comments"),
            shares: counter(&self.mapping.shares, "shares"),
            collects: counter(&self.mapping.collects, "collects"),
        };

        let date = first_present(row, &self.mapping.date)
            .and_then(cell_text)
            .and_then(|raw| parse_post_date(&raw));

        let description = first_present(row, &self.mapping.description)
            .and_then(cell_text)
            .unwrap_or_default();

        let permalink = first_present(row, &self.mapping.permalink)
            .and_then(cell_text)
            .unwrap_or_default();

        MappedRow {
            post: RawPost {
                date,
                description,
                counters,
                permalink,
            },
            malformed_fields,
        }
    }
}

/// Mappers for every platform, with config column overrides applied.
///
/// # Errors
/// Returns `UnknownPlatform` if the config names a platform with no preset.
pub fn mappers_from_config(config: &TomlConfig) -> IngestResult<BTreeMap<Platform, RowMapper>> {
    let mut mappers: BTreeMap<Platform, RowMapper> = Platform::ALL
        .iter()
        .map(|&p| (p, RowMapper::for_platform(p)))
        .collect();

    for (name, overrides) in &config.platforms {
        let platform: Platform = name
            .parse()
            .map_err(|_| IngestError::UnknownPlatform(name.clone()))?;
        let mapping = ColumnMapping::preset(platform).apply_overrides(overrides);
        debug!(platform = %platform, "Applied column overrides");
        mappers.insert(platform, RowMapper::new(platform, mapping));
    }

    Ok(mappers)
}

/// Load an export file: a JSON array of row objects.
///
/// Non-object array entries are skipped with a warning.
///
/// # Errors
/// - `MissingDataset` if the file does not exist
/// - `InvalidDataset` if the top level is not an array
pub fn load_rows(path: &Path, platform: Platform) -> IngestResult<Vec<Row>> {
    if !path.is_file() {
        return Err(IngestError::MissingDataset {
            platform,
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| IngestError::InvalidDataset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let Value::Array(entries) = value else {
        return Err(IngestError::InvalidDataset {
            path: path.to_path_buf(),
            reason: "top level must be an array of row objects".to_string(),
        });
    };

    let total = entries.len();
    let rows: Vec<Row> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();

    if rows.len() < total {
        warn!(
            platform = %platform,
            skipped = total - rows.len(),
            "Skipped non-object entries in dataset"
        );
    }

    debug!(platform = %platform, rows = rows.len(), path = %path.display(), "Loaded dataset");
    Ok(rows)
}

/// First candidate column that is present, non-null and not blank
fn first_present<'a>(row: &'a Row, names: &[String]) -> Option<&'a Value> {
    names.iter().filter_map(|name| row.get(name)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// Text content of a scalar cell
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test row must be an object"),
        }
    }

    #[test]
    fn test_tiktok_row() {
        let mapper = RowMapper::for_platform(Platform::TikTok);
        let mapped = mapper.map_row(&row(json!({
            "publish_date": "2024-03-05 18:22:10",
            "description": "nuevo tema @camilo",
            "views": 1000,
            "likes": "50",
            "comments": 5,
            "shares": 3.0,
            "collects": "2.0",
            "video_url": "https://tiktok.com/v/1"
        })));

        assert_eq!(mapped.malformed_fields, 0);
        assert_eq!(mapped.post.date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(mapped.post.description, "nuevo tema @camilo");
        assert_eq!(
            mapped.post.counters,
            Counters {
                views: 1000,
                likes: 50,
                comments: 5,
                shares: 3,
                collects: 2
            }
        );
        assert_eq!(mapped.post.permalink, "https://tiktok.com/v/1");
    }

    #[test]
    fn test_instagram_fallback_columns() {
        let mapper = RowMapper::for_platform(Platform::Instagram);
        let mapped = mapper.map_row(&row(json!({
            "date": "2024-02-10",
            "Description": "Ha*Ash en vivo",
            "Visualizaciones": "",
            "Alcance": 800,
            "Me gusta": 40
        })));

        assert_eq!(mapped.post.description, "Ha*Ash en vivo");
        assert_eq!(mapped.post.counters.views, 800);
        assert_eq!(mapped.post.counters.likes, 40);
        assert_eq!(mapped.post.counters.shares, 0);
        assert_eq!(mapped.malformed_fields, 0);
    }

    #[test]
    fn test_malformed_counters_counted() {
        let mapper = RowMapper::for_platform(Platform::TikTok);
        let mapped = mapper.map_row(&row(json!({
            "views": "lots",
            "likes": -4,
            "comments": null,
            "shares": "NaN"
        })));

        assert_eq!(mapped.post.counters, Counters::default());
        assert_eq!(mapped.malformed_fields, 3);
    }

    #[test]
    fn test_missing_or_bad_date() {
        let mapper = RowMapper::for_platform(Platform::TikTok);
        assert!(mapper.map_row(&row(json!({ "views": 1 }))).missing_date());
        assert!(mapper
            .map_row(&row(json!({ "publish_date": "yesterday" })))
            .missing_date());
    }

    #[test]
    fn test_numeric_video_id_permalink() {
        let mapper = RowMapper::for_platform(Platform::TikTok);
        let mapped = mapper.map_row(&row(json!({ "video_id": 7301234567890u64 })));
        assert_eq!(mapped.post.permalink, "7301234567890");
    }

    #[test]
    fn test_apply_overrides_replaces_only_set_fields() {
        let overrides = ColumnOverrides {
            views: Some(vec!["Reproducciones".to_string()]),
            ..Default::default()
        };
        let mapping = ColumnMapping::preset(Platform::Instagram).apply_overrides(&overrides);
        assert_eq!(mapping.views, vec!["Reproducciones".to_string()]);
        assert_eq!(mapping.likes, vec!["Me gusta".to_string()]);
    }

    #[test]
    fn test_mappers_from_config_rejects_unknown_platform() {
        let mut config = TomlConfig::default();
        config
            .platforms
            .insert("myspace".to_string(), ColumnOverrides::default());
        assert!(matches!(
            mappers_from_config(&config),
            Err(IngestError::UnknownPlatform(name)) if name == "myspace"
        ));
    }

    #[test]
    fn test_mappers_from_config_applies_overrides() {
        let mut config = TomlConfig::default();
        config.platforms.insert(
            "ig".to_string(),
            ColumnOverrides {
                likes: Some(vec!["Likes".to_string()]),
                ..Default::default()
            },
        );
        let mappers = mappers_from_config(&config).unwrap();
        assert_eq!(mappers.len(), 2);
        assert_eq!(
            mappers[&Platform::Instagram].mapping().likes,
            vec!["Likes".to_string()]
        );
    }

    #[test]
    fn test_load_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiktok.json");
        std::fs::write(&path, r#"[{"views": 1}, 5, {"views": 2}]"#).unwrap();

        let rows = load_rows(&path, Platform::TikTok).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_load_rows_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_rows(&missing, Platform::TikTok),
            Err(IngestError::MissingDataset { .. })
        ));

        let object = dir.path().join("object.json");
        std::fs::write(&object, r#"{"views": 1}"#).unwrap();
        assert!(matches!(
            load_rows(&object, Platform::TikTok),
            Err(IngestError::InvalidDataset { .. })
        ));

        let junk = dir.path().join("junk.json");
        std::fs::write(&junk, "not json").unwrap();
        assert!(matches!(
            load_rows(&junk, Platform::Instagram),
            Err(IngestError::InvalidDataset { .. })
        ));
    }
}
