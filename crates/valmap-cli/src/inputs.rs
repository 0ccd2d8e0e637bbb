//! File-backed inputs: object poses and pairwise tables.
//!
//! The core only needs an in-memory sequence of objects and a reshaped
//! table; this module is the thin layer that gets them off disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use valmap_core::pairwise::parse_dense;
use valmap_core::{PairwiseTable, TableParams};
use valmap_types::{ReferenceObject, ValueMapError};

use crate::config::PairwiseSection;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed object file {path}: {source}")]
    Objects {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid pairwise table {path}: {source}")]
    Table {
        path: PathBuf,
        source: ValueMapError,
    },
}

fn read(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON array of objects, e.g. `[{"x": -3, "y": -4}, {"x": 2, "y": 1, "label": 7}]`.
pub fn load_objects(path: &Path) -> Result<Vec<ReferenceObject>, InputError> {
    let raw = read(path)?;
    let objects: Vec<ReferenceObject> =
        serde_json::from_str(&raw).map_err(|source| InputError::Objects {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), count = objects.len(), "loaded reference objects");
    Ok(objects)
}

/// Read and reshape the pairwise table named by `section`, using the
/// distance axis of `table`.
pub fn load_pairwise(
    section: &PairwiseSection,
    table: &TableParams,
) -> Result<PairwiseTable, InputError> {
    let raw = read(&section.path)?;
    let to_table_error = |source| InputError::Table {
        path: section.path.clone(),
        source,
    };
    let flat = parse_dense(&raw).map_err(to_table_error)?;
    let pairwise = PairwiseTable::from_flat(
        flat,
        section.number_objects,
        table.radius_threshold,
        table.discrete_size,
    )
    .map_err(to_table_error)?;
    info!(
        path = %section.path.display(),
        number_objects = section.number_objects,
        discrete_size = table.discrete_size,
        "loaded pairwise table"
    );
    Ok(pairwise)
}
