//! Tool configuration module.
//!
//! Handles loading, validating, and merging a `magick-ops.toml` file. Stock
//! defaults are overridden by whatever keys the user file sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tools]
//! convert = "convert"       # Executable used by every transform
//! identify = "identify"     # Executable used to read image dimensions
//!
//! [output]
//! format = "png"            # Default output format: "png" or "jpg"
//!
//! [temp]
//! # dir = "/var/tmp"        # Temp root (omit to use TMPDIR, TMP, TEMP, then /tmp)
//!
//! [processing]
//! # max_processes = 4       # Max tool processes running at once (omit for no limit)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Temp Directory Resolution
//!
//! The temp root is resolved once, here, when a pipeline is built:
//! an explicit `temp.dir` wins, then the first non-empty of [`TEMP_DIR_VARS`],
//! then [`DEFAULT_TEMP_DIR`]. The imaging core never reads the environment.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variables checked, in order, for the temp root.
pub const TEMP_DIR_VARS: [&str; 3] = ["TMPDIR", "TMP", "TEMP"];

/// Temp root used when neither config nor environment names one.
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `magick-ops.toml`.
///
/// All fields have defaults. Config files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// External executables.
    pub tools: ToolsConfig,
    /// Output defaults.
    pub output: OutputConfig,
    /// Temp file location.
    pub temp: TempConfig,
    /// Process fan-out limits.
    pub processing: ProcessingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.convert.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "tools.convert must not be empty".into(),
            ));
        }
        if self.tools.identify.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "tools.identify must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self
            .temp
            .dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(ConfigError::Validation(
                "temp.dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the temp root from this config and the process environment.
    pub fn temp_root(&self) -> PathBuf {
        resolve_temp_dir(self.temp.dir.as_deref(), |name| std::env::var(name).ok())
    }
}

/// External executables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Transform executable (crop, resize, draw, append, re-encode).
    pub convert: PathBuf,
    /// Inspection executable (dimensions).
    pub identify: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            convert: PathBuf::from("convert"),
            identify: PathBuf::from("identify"),
        }
    }
}

/// Output defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Format used when a caller does not pick one.
    pub format: OutputFormat,
}

/// Temp file location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TempConfig {
    /// Explicit temp root. When absent the environment is consulted.
    pub dir: Option<PathBuf>,
}

/// Process fan-out limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of tool processes running at once.
    /// When absent, every call launches immediately.
    pub max_processes: Option<usize>,
}

/// Resolve the temp root.
///
/// - `Some(dir)` configured → `dir`
/// - otherwise the first of [`TEMP_DIR_VARS`] that `lookup` returns non-empty
/// - otherwise [`DEFAULT_TEMP_DIR`]
pub fn resolve_temp_dir(
    configured: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    TEMP_DIR_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file.
///
/// `None` yields the validated stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    let overlay: Option<toml::Value> = match path {
        Some(path) => Some(toml::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `magick-ops.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# magick-ops configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# External tools
# ---------------------------------------------------------------------------
[tools]
# Executable for every transform (convert, crop, resample, draw, stack).
convert = "convert"
# Executable used to read image dimensions.
identify = "identify"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Format written when none is requested: "png" (lossless) or "jpg" (lossy).
format = "png"

# ---------------------------------------------------------------------------
# Temp files
# ---------------------------------------------------------------------------
[temp]
# Directory for the short-lived input/output files of each call.
# When unset: $TMPDIR, then $TMP, then $TEMP, then /tmp.
# dir = "/var/tmp"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of tool processes running at once.
# When unset, every call launches its process immediately.
# max_processes = 4
"##
}
