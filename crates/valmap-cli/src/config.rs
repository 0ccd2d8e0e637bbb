//! Configuration Vault – reads/writes `~/.valmap/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use valmap_core::{GridParams, TableParams};
use valmap_types::ReferenceObject;

/// Errors raised while loading or saving the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Optional `[pairwise]` section: evaluate against a file-backed pairwise
/// table instead of the truncated-normal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseSection {
    /// Dense text file of `number_objects² × discrete_size` floats.
    pub path: PathBuf,
    pub number_objects: usize,
    /// Subject label to score from.  When absent every pair is summed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<usize>,
}

/// Persisted evaluation configuration stored in `~/.valmap/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Distance-table parameters.
    #[serde(default)]
    pub table: TableParams,

    /// Sampling grid parameters.
    #[serde(default)]
    pub grid: GridParams,

    /// Reference objects used when no `--objects` file is given.
    #[serde(default = "default_objects")]
    pub objects: Vec<ReferenceObject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairwise: Option<PairwiseSection>,
}

fn default_objects() -> Vec<ReferenceObject> {
    vec![
        ReferenceObject::new(-3.0, -4.0),
        ReferenceObject::new(2.0, 1.0),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table: TableParams::default(),
            grid: GridParams::default(),
            objects: default_objects(),
            pairwise: None,
        }
    }
}

/// Return the path to `~/.valmap/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".valmap").join("config.toml")
}

/// Load the config from `path`, applying environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: Config = toml::from_str(&raw)?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `VALMAP_*` environment variable overrides to `cfg`.
///
/// Unparsable values are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `VALMAP_MEAN` | `table.mean` |
/// | `VALMAP_SIGMA` | `table.sigma` |
/// | `VALMAP_MAX_DIST` | `grid.max_dist` |
/// | `VALMAP_GRID_SIZE` | `grid.discrete_space_size` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_from(cfg, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` in place of the process environment.
pub(crate) fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("VALMAP_MEAN")
        && let Ok(mean) = v.parse::<f64>() {
            cfg.table.mean = mean;
        }
    if let Some(v) = lookup("VALMAP_SIGMA")
        && let Ok(sigma) = v.parse::<f64>() {
            cfg.table.sigma = sigma;
        }
    if let Some(v) = lookup("VALMAP_MAX_DIST")
        && let Ok(max_dist) = v.parse::<f64>() {
            cfg.grid.max_dist = max_dist;
        }
    if let Some(v) = lookup("VALMAP_GRID_SIZE")
        && let Ok(size) = v.parse::<usize>() {
            cfg.grid.discrete_space_size = size;
        }
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let raw = toml::to_string_pretty(cfg)?;
    fs::write(path, raw).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
