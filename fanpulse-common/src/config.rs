//! Configuration loading and root folder resolution
//!
//! Settings come from four tiers, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is never fatal: the loader warns and falls back to
//! defaults. A config file that exists but is invalid is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the root (output) folder
pub const ROOT_FOLDER_ENV: &str = "FANPULSE_ROOT_FOLDER";

/// Environment variable naming the config file
pub const CONFIG_FILE_ENV: &str = "FANPULSE_CONFIG";

/// Default fuzzy-match acceptance threshold.
///
/// The two historical scripts disagreed (0.75 for caption matching, 0.6 for
/// mention-only matching); the caption matcher's stricter value is the default.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.75;

/// Default maximum description length in exported posts
pub const DEFAULT_DESCRIPTION_MAX_CHARS: usize = 200;

/// Label written for posts without an artist
pub const DEFAULT_UNATTRIBUTED_LABEL: &str = "Sin artista";

/// How to pick among several override keys found in one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverridePolicy {
    /// First key in table order wins
    #[default]
    FirstInOrder,
    /// Longest matching key wins; ties go to table order
    LongestKey,
}

/// Which element a median takes for even-length groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianRule {
    /// Element at index `(n - 1) / 2` of the sorted values
    #[default]
    LowerMiddle,
    /// Element at index `n / 2` of the sorted values
    UpperMiddle,
    /// Mean of the two middle elements
    Interpolated,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is unset
    pub level: String,
    /// Optional log file; stderr when absent
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Matching section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub threshold: f64,
    pub override_policy: OverridePolicy,
    pub median_rule: MedianRule,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            override_policy: OverridePolicy::default(),
            median_rule: MedianRule::default(),
        }
    }
}

/// Output section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub description_max_chars: usize,
    pub unattributed_label: String,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            description_max_chars: DEFAULT_DESCRIPTION_MAX_CHARS,
            unattributed_label: DEFAULT_UNATTRIBUTED_LABEL.to_string(),
            pretty: true,
        }
    }
}

/// Per-platform column name overrides.
///
/// Each field lists candidate column names in priority order. Fields left
/// unset keep the built-in preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOverrides {
    pub date: Option<Vec<String>>,
    pub description: Option<Vec<String>>,
    pub views: Option<Vec<String>>,
    pub likes: Option<Vec<String>>,
    pub comments: Option<Vec<String>>,
    pub shares: Option<Vec<String>>,
    pub collects: Option<Vec<String>>,
    pub permalink: Option<Vec<String>>,
}

/// Top-level TOML config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
    pub output: OutputConfig,
    /// Keyed by platform identifier (`tiktok`, `instagram`)
    pub platforms: BTreeMap<String, ColumnOverrides>,
}

impl TomlConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let t = self.matching.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(Error::Config(format!(
                "matching.threshold must be within [0, 1], got {}",
                t
            )));
        }
        if self.output.description_max_chars == 0 {
            return Err(Error::Config(
                "output.description_max_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;
    debug!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}

/// Where a loaded config came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// `--config` argument
    Explicit(PathBuf),
    /// `FANPULSE_CONFIG`
    Env(PathBuf),
    /// `<config_dir>/fanpulse/config.toml`
    UserDefault(PathBuf),
    /// `FANPULSE_CONFIG` names a file that does not exist
    MissingEnvFile(PathBuf),
    /// No config file anywhere
    CompiledDefaults,
}

impl ConfigSource {
    /// True when the config fell back to compiled defaults
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConfigSource::MissingEnvFile(_) | ConfigSource::CompiledDefaults)
    }

    /// Log where the config came from; fallbacks are warnings.
    ///
    /// Called once a subscriber is installed, since config is loaded before
    /// logging is configured.
    pub fn log(&self) {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Env(path) | ConfigSource::UserDefault(path) => {
                info!(path = %path.display(), "Loaded config file")
            }
            ConfigSource::MissingEnvFile(path) => {
                warn!(path = %path.display(), "{} points to a missing file, using defaults", CONFIG_FILE_ENV)
            }
            ConfigSource::CompiledDefaults => warn!("No config file found, using defaults"),
        }
    }
}

/// Load the config file and report where it came from.
///
/// Lookup order: explicit path, `FANPULSE_CONFIG`, then
/// `<config_dir>/fanpulse/config.toml`. An explicit path that does not exist
/// is an error; an absent default file is not. Nothing is logged here.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok((load_toml_config(path)?, ConfigSource::Explicit(path.to_path_buf())));
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok((load_toml_config(&path)?, ConfigSource::Env(path)));
        }
        return Ok((TomlConfig::default(), ConfigSource::MissingEnvFile(path)));
    }

    match default_config_path() {
        Some(path) if path.exists() => Ok((load_toml_config(&path)?, ConfigSource::UserDefault(path))),
        _ => Ok((TomlConfig::default(), ConfigSource::CompiledDefaults)),
    }
}

/// Load the config file, falling back to defaults (with a warning) when none
/// exists
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    let (config, source) = load_config(explicit)?;
    source.log();
    Ok(config)
}

/// Platform config file location (`~/.config/fanpulse/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fanpulse").join("config.toml"))
}

/// Root folder resolution in priority order:
/// 1. Command-line argument
/// 2. `FANPULSE_ROOT_FOLDER`
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("fanpulse"))
        .unwrap_or_else(|| PathBuf::from("./fanpulse_data"))
}

/// Write bytes via temp file + rename so readers never see a partial file
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Serialize a config to TOML and write it atomically
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    write_atomic(path, content.as_bytes())
}
