//! Data loaders for the NEO catalog and close-approach files.
//!
//! This module provides parsers for:
//! - The NEO catalog CSV (header row, fields looked up by column name)
//! - The close-approach JSON document (a `data` array of positional entries)
//!
//! Field coercion never fails. A malformed cell degrades to its unknown
//! state, and a row that cannot carry a designation or date is skipped with
//! a warning. Only unreadable files and missing structure are errors.
//! Neither loader links approaches to NEOs; see [`NeoCatalog`](super::catalog::NeoCatalog).

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::{debug, info, warn};
use serde_json::Value;
use thiserror::Error;

use super::dates::parse_calendar_date;
use super::models::{coerce_float, CloseApproach, NearEarthObject};
use crate::config::{ApproachJsonConfig, NeoCsvConfig};

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot read '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("'{}' has no top-level '{key}' key", .path.display())]
    MissingDataKey { path: PathBuf, key: String },

    #[error("'{key}' in '{}' is not an array", .path.display())]
    InvalidDataKey { path: PathBuf, key: String },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| LoaderError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// Load near-Earth objects from a CSV catalog.
///
/// The file must start with a header row. The designation, name, diameter
/// and hazard flag columns are located by name (`pdes`, `name`, `diameter`,
/// `pha` unless overridden), so their position and any extra columns do not
/// matter. Short rows are accepted; their missing cells coerce like empty
/// ones.
///
/// # Arguments
///
/// * `path` - Path to the NEO CSV file
/// * `config` - Column names (uses defaults if None)
///
/// # Returns
///
/// The NEOs in file row order.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is absent
/// from the header, or the CSV itself is malformed.
pub fn load_neos<P: AsRef<Path>>(
    path: P,
    config: Option<&NeoCsvConfig>,
) -> Result<Vec<NearEarthObject>> {
    let path = path.as_ref();
    let default_config = NeoCsvConfig::default();
    let config = config.unwrap_or(&default_config);

    let file = open_file(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let col_map: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    // Resolve designation, name, diameter, hazardous
    let mut indices = [0usize; 4];
    let mut missing = Vec::new();
    for (slot, column) in indices.iter_mut().zip(config.columns()) {
        match col_map.get(column) {
            Some(&idx) => *slot = idx,
            None => missing.push(column),
        }
    }
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns(missing.join(", ")));
    }
    let [des_idx, name_idx, diameter_idx, pha_idx] = indices;

    let mut neos = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let designation = field(des_idx);
        if designation.is_empty() {
            // +2: header line, 1-based lines
            warn!("{}: line {} has no designation, skipping", path.display(), row + 2);
            skipped += 1;
            continue;
        }

        neos.push(NearEarthObject::from_fields(
            designation,
            field(name_idx),
            field(diameter_idx),
            field(pha_idx),
        ));
    }

    info!(
        "Loaded {} NEOs from {} ({} rows skipped)",
        neos.len(),
        path.display(),
        skipped
    );

    Ok(neos)
}

/// Load close approaches from a JSON document.
///
/// The document is an object whose `data` key holds an array of entries.
/// Each entry is itself an array read by position: designation at index 0,
/// calendar date at 3, distance at 4 and velocity at 7 unless overridden.
/// Other positions are ignored.
///
/// Entries that are not arrays, or that lack a designation or a parseable
/// date, are skipped with a warning. Missing or malformed numbers become NaN.
/// Approaches are returned unlinked.
///
/// # Arguments
///
/// * `path` - Path to the close-approach JSON file
/// * `config` - Key and field positions (uses defaults if None)
///
/// # Returns
///
/// The approaches in document order.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the `data`
/// key is absent or not an array.
pub fn load_approaches<P: AsRef<Path>>(
    path: P,
    config: Option<&ApproachJsonConfig>,
) -> Result<Vec<CloseApproach>> {
    let path = path.as_ref();
    let default_config = ApproachJsonConfig::default();
    let config = config.unwrap_or(&default_config);

    let file = open_file(path)?;
    let document: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoaderError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let entries = match document.get(config.data_key.as_str()) {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(LoaderError::InvalidDataKey {
                path: path.to_path_buf(),
                key: config.data_key.clone(),
            })
        }
        None => {
            return Err(LoaderError::MissingDataKey {
                path: path.to_path_buf(),
                key: config.data_key.clone(),
            })
        }
    };

    if let Some(count) = document.get("count").and_then(declared_count) {
        if count != entries.len() {
            warn!(
                "{}: declares {} entries but '{}' holds {}",
                path.display(),
                count,
                config.data_key,
                entries.len()
            );
        }
    }

    let mut approaches = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        match parse_entry(entry, config) {
            Ok(approach) => approaches.push(approach),
            Err(reason) => {
                warn!("{}: entry {}: {}, skipping", path.display(), idx, reason);
                skipped += 1;
            }
        }
    }

    info!(
        "Loaded {} close approaches from {} ({} entries skipped)",
        approaches.len(),
        path.display(),
        skipped
    );

    Ok(approaches)
}

fn parse_entry(
    entry: &Value,
    config: &ApproachJsonConfig,
) -> std::result::Result<CloseApproach, &'static str> {
    let fields = entry.as_array().ok_or("not an array")?;

    let designation = fields
        .get(config.designation_index)
        .and_then(scalar_text)
        .filter(|des| !des.is_empty())
        .ok_or("missing designation")?;

    let time = fields
        .get(config.date_index)
        .and_then(Value::as_str)
        .and_then(parse_calendar_date)
        .ok_or("missing or malformed calendar date")?;

    let distance = fields.get(config.distance_index).map_or(f64::NAN, coerce_float);
    let velocity = fields.get(config.velocity_index).map_or(f64::NAN, coerce_float);

    if distance.is_nan() || velocity.is_nan() {
        debug!("approach of {} on {} has unknown distance or velocity", designation, time);
    }

    Ok(CloseApproach::new(designation, time, distance, velocity))
}

/// Text of a JSON string or number.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn declared_count(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        _ => None,
    }
}
