use crate::types::VolcanoRecord;
use csv::{ReaderBuilder, StringRecord};
use geojson::{FeatureCollection, GeoJson};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Columns the pipeline computes with. Anything else in the CSV is kept as
/// passthrough data on the record.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Volcano Name",
    "Country",
    "Region",
    "Latitude",
    "Longitude",
    "Type",
    "Status",
];

/// Leading index column written by the tool that produced the CSV. Dropped
/// on load.
const INDEX_COLUMN: &str = "Unnamed: 0";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' not found in CSV")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid value '{value}' for column '{column}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("failed to parse GeoJSON: {0}")]
    Geojson(#[from] geojson::Error),
    #[error("boundary document must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

pub fn load_volcanoes(path: &Path) -> Result<Vec<VolcanoRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().from_reader(BufReader::new(file));
    let headers = rdr.headers()?.clone();

    let col_indices: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h, i))
        .collect();

    // Fail fast if the file does not have the shape we expect.
    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = *col_indices
            .get(name)
            .ok_or(LoadError::MissingColumn(name))?;
    }
    let [name_idx, country_idx, region_idx, lat_idx, lon_idx, type_idx, status_idx] = required;

    let mut records = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1, first data row is line 2.
        let row = i + 2;

        let mut extra = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let header = headers.get(idx).unwrap_or("");
            if header.is_empty() || header == INDEX_COLUMN || required.contains(&idx) {
                continue;
            }
            extra.insert(header.to_string(), value.to_string());
        }

        records.push(VolcanoRecord {
            name: field(&record, name_idx),
            country: field(&record, country_idx),
            region: field(&record, region_idx),
            latitude: parse_coordinate(&record, lat_idx, "Latitude", row)?,
            longitude: parse_coordinate(&record, lon_idx, "Longitude", row)?,
            kind: field(&record, type_idx),
            status: field(&record, status_idx),
            extra,
        });
    }

    Ok(records)
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

fn parse_coordinate(
    record: &StringRecord,
    idx: usize,
    column: &'static str,
    row: usize,
) -> Result<f64, LoadError> {
    let raw = record.get(idx).unwrap_or("");
    raw.trim().parse::<f64>().map_err(|_| LoadError::InvalidField {
        row,
        column,
        value: raw.to_string(),
    })
}

pub fn load_boundaries(path: &Path) -> Result<FeatureCollection, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson = GeoJson::from_reader(BufReader::new(file)).map_err(geojson::Error::from)?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => Err(LoadError::NotFeatureCollection),
    }
}

/// Memoizes the two load functions per input path, keyed on the file's
/// modification time. A hit hands back the cached `Arc` without touching the
/// file again; a changed mtime reloads. Best effort only: if the mtime cannot
/// be read, the file is loaded fresh every time.
#[derive(Default)]
pub struct DatasetCache {
    volcanoes: HashMap<PathBuf, CacheEntry<Arc<Vec<VolcanoRecord>>>>,
    boundaries: HashMap<PathBuf, CacheEntry<Arc<FeatureCollection>>>,
}

struct CacheEntry<T> {
    modified: Option<SystemTime>,
    value: T,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volcanoes(&mut self, path: &Path) -> Result<Arc<Vec<VolcanoRecord>>, LoadError> {
        let modified = file_mtime(path);
        if let Some(entry) = self.volcanoes.get(path) {
            if modified.is_some() && entry.modified == modified {
                return Ok(Arc::clone(&entry.value));
            }
        }
        let value = Arc::new(load_volcanoes(path)?);
        self.volcanoes.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    pub fn boundaries(&mut self, path: &Path) -> Result<Arc<FeatureCollection>, LoadError> {
        let modified = file_mtime(path);
        if let Some(entry) = self.boundaries.get(path) {
            if modified.is_some() && entry.modified == modified {
                return Ok(Arc::clone(&entry.value));
            }
        }
        let value = Arc::new(load_boundaries(path)?);
        self.boundaries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    /// Drop any cached entries for `path`.
    pub fn invalidate(&mut self, path: &Path) {
        self.volcanoes.remove(path);
        self.boundaries.remove(path);
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
