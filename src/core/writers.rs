//! Data writers for CSV and JSON close-approach exports.
//!
//! This module provides functions for writing linked close approaches:
//! - CSV with a fixed 7-column header, always present
//! - JSON as an array of records with a nested `neo` object
//!
//! Both writers render a NEO's missing name as `""` and its unknown diameter
//! as NaN, through [`NearEarthObject::name_or_empty`] and
//! [`NearEarthObject::diameter_km`]. Every approach must already be linked
//! to a NEO; this is checked before the output file is created.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use thiserror::Error;

use super::models::{CloseApproach, NearEarthObject};

/// Column order of the CSV export.
pub const CSV_HEADER: [&str; 7] = [
    "datetime_utc",
    "distance_au",
    "velocity_km_s",
    "designation",
    "name",
    "diameter_km",
    "potentially_hazardous",
];

/// Failures while exporting close approaches.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The output file's directory could not be created.
    #[error("cannot create output directory '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created or truncated.
    #[error("cannot create output file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Buffered output could not be flushed to disk.
    #[error("cannot write output file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV encoder rejected a row.
    #[error("CSV export to '{path}' failed: {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// The JSON serializer failed.
    #[error("JSON export to '{path}' failed: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An approach reached a writer without a linked NEO.
    #[error("close approach of '{designation}' is not linked to a NEO")]
    UnresolvedApproach { designation: String },
}

/// Result of an export.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Pick a format from the file extension (`.csv` or `.json`, any case).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(OutputFormat::Csv)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(OutputFormat::Json)
        } else {
            None
        }
    }
}

/// Make sure the directory holding `path` exists. A bare file name needs none.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.exists() {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDirectory {
            path: parent.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Open `path` for export, truncating any previous output.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| WriteError::CreateFile {
            path: path.display().to_string(),
            source,
        })
}

/// The NEO an approach was linked to by the catalog.

fn linked_neo(approach: &CloseApproach) -> Result<&NearEarthObject> {
    approach.neo().ok_or_else(|| WriteError::UnresolvedApproach {
        designation: approach.designation().to_string(),
    })
}

/// Write close approaches to CSV.
///
/// Creates a CSV file whose first row is always [`CSV_HEADER`], followed by
/// one row per approach in input order:
///
/// | column | value |
/// |---|---|
/// | `datetime_utc` | approach time, `YYYY-MM-DD HH:MM:SS` |
/// | `distance_au`, `velocity_km_s` | numbers |
/// | `designation` | NEO designation |
/// | `name` | NEO name, empty when unnamed |
/// | `diameter_km` | NEO diameter, `NaN` when unknown |
/// | `potentially_hazardous` | `true` / `false` |
///
/// An empty input produces a header-only file.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `approaches` - Linked close approaches, already filtered and ordered
///
/// # Errors
///
/// Returns an error if:
/// - An approach is not linked to a NEO (nothing is written)
/// - Parent directories cannot be created
/// - File cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use neo_pipeline::core::catalog::NeoCatalog;
/// use neo_pipeline::core::writers::write_to_csv;
/// use std::path::Path;
///
/// let catalog = NeoCatalog::new(Vec::new(), Vec::new());
/// write_to_csv(Path::new("approaches.csv"), catalog.approaches().take(10)).unwrap();
/// ```
pub fn write_to_csv<'a, I>(path: &Path, approaches: I) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
{
    let rows = approaches
        .into_iter()
        .map(|approach| linked_neo(approach).map(|neo| (approach, neo)))
        .collect::<Result<Vec<_>>>()?;

    ensure_parent_dirs(path)?;
    let buf_writer = create_buffered_writer(path)?;
    let mut csv_writer = csv::Writer::from_writer(buf_writer);

    let path_str = path.display().to_string();

    // Write header
    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    // Write data rows
    for (approach, neo) in &rows {
        csv_writer
            .write_record(&[
                approach.time().to_string(),
                approach.distance().to_string(),
                approach.velocity().to_string(),
                neo.designation().to_string(),
                neo.name_or_empty().to_string(),
                neo.diameter_km().to_string(),
                neo.is_hazardous().to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    info!("Wrote {} close approaches to {}", rows.len(), path.display());

    Ok(())
}

#[derive(Serialize)]
struct ApproachRecord<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: NeoRecord<'a>,
}

#[derive(Serialize)]
struct NeoRecord<'a> {
    designation: &'a str,
    name: &'a str,
    diameter_km: f64,
    potentially_hazardous: bool,
}

impl<'a> ApproachRecord<'a> {
    fn from_approach(approach: &'a CloseApproach) -> Result<Self> {
        let neo = linked_neo(approach)?;
        Ok(Self {
            datetime_utc: approach.time_str(),
            distance_au: approach.distance(),
            velocity_km_s: approach.velocity(),
            neo: NeoRecord {
                designation: neo.designation(),
                name: neo.name_or_empty(),
                diameter_km: neo.diameter_km(),
                potentially_hazardous: neo.is_hazardous(),
            },
        })
    }
}

/// JSON formatter with `", "` / `": "` separators and a bare `NaN` token.
struct RecordFormatter;

impl Formatter for RecordFormatter {
    // serde_json sends non-finite floats to write_null. Records have no
    // optional fields and models hold no infinities, so null is always NaN.
    fn write_null<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b"NaN")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Write close approaches to JSON.
///
/// Creates a JSON array with one object per approach in input order:
///
/// ```text
/// [{"datetime_utc": "2025-01-01 06:00", "distance_au": 0.1, "velocity_km_s": 5.2,
///   "neo": {"designation": "433", "name": "Eros", "diameter_km": 16.84,
///           "potentially_hazardous": false}}]
/// ```
///
/// A missing name is written as `""` and an unknown diameter as the bare
/// token `NaN`. An empty input produces `[]`.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `approaches` - Linked close approaches, already filtered and ordered
///
/// # Errors
///
/// Returns an error if:
/// - An approach is not linked to a NEO (nothing is written)
/// - Parent directories cannot be created
/// - File cannot be created or written to
pub fn write_to_json<'a, I>(path: &Path, approaches: I) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
{
    let records = approaches
        .into_iter()
        .map(ApproachRecord::from_approach)
        .collect::<Result<Vec<_>>>()?;

    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;

    let path_str = path.display().to_string();

    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, RecordFormatter);
    records
        .serialize(&mut serializer)
        .map_err(|e| WriteError::JsonError {
            path: path_str.clone(),
            source: e,
        })?;

    writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    info!("Wrote {} close approaches to {}", records.len(), path.display());

    Ok(())
}

/// Write close approaches in the given format.
///
/// See [`write_to_csv`] and [`write_to_json`].
pub fn write_approaches<'a, I>(path: &Path, approaches: I, format: OutputFormat) -> Result<()>
where
    I: IntoIterator<Item = &'a CloseApproach>,
{
    match format {
        OutputFormat::Csv => write_to_csv(path, approaches),
        OutputFormat::Json => write_to_json(path, approaches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::NeoCatalog;
    use crate::core::dates::parse_calendar_date;
    use chrono::NaiveDateTime;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn approach(designation: &str, date: &str, distance: f64, velocity: f64) -> CloseApproach {
        CloseApproach::new(designation, parse_calendar_date(date).unwrap(), distance, velocity)
    }

    fn create_test_catalog() -> NeoCatalog {
        let neos = vec![
            NearEarthObject::from_fields("433", "Eros", "16.84", "N"),
            NearEarthObject::from_fields("2020 AB", "", "0.25", "Y"),
        ];
        let approaches = vec![
            approach("433", "2025-Jan-01 06:00", 0.1, 5.2),
            approach("2020 AB", "2031-Oct-09 23:59", 0.0123, 17.75),
        ];
        NeoCatalog::new(neos, approaches)
    }

    fn create_catalog_with_unknowns() -> NeoCatalog {
        let neos = vec![NearEarthObject::from_fields("99942", "Apophis", "", "Y")];
        let approaches = vec![
            approach("99942", "2029-Apr-13 21:46", 0.000254, 7.42),
            approach("2099 ZZ", "2030-Jan-01 00:00", 0.3, 12.0),
        ];
        NeoCatalog::new(neos, approaches)
    }

    #[test]
    fn test_write_to_csv() {
        init_logger();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let catalog = create_test_catalog();

        write_to_csv(&path, catalog.approaches()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "datetime_utc,distance_au,velocity_km_s,designation,name,diameter_km,potentially_hazardous"
        );
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert_eq!(lines[1], "2025-01-01 06:00:00,0.1,5.2,433,Eros,16.84,false");
        assert_eq!(lines[2], "2031-10-09 23:59:00,0.0123,17.75,2020 AB,,0.25,true");
    }

    #[test]
    fn test_write_to_csv_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let catalog = create_catalog_with_unknowns();

        write_to_csv(&path, catalog.approaches()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "2029-04-13 21:46:00,0.000254,7.42,99942,Apophis,NaN,true");
        assert_eq!(lines[2], "2030-01-01 00:00:00,0.3,12,2099 ZZ,,NaN,false");
    }

    #[test]
    fn test_write_to_csv_quotes_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let catalog = NeoCatalog::new(
            vec![NearEarthObject::from_fields("1", "Ceres, Dwarf", "939.4", "N")],
            vec![approach("1", "2025-Jan-01 06:00", 1.6, 20.0)],
        );

        write_to_csv(&path, catalog.approaches()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().contains(",\"Ceres, Dwarf\","));
    }

    #[test]
    fn test_write_to_csv_empty_is_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_to_csv(&path, std::iter::empty()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("datetime_utc,"));
    }

    #[test]
    fn test_write_to_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let catalog = create_test_catalog();

        write_to_json(&path, catalog.approaches().take(1)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[{\"datetime_utc\": \"2025-01-01 06:00\", \"distance_au\": 0.1, \"velocity_km_s\": 5.2, \
             \"neo\": {\"designation\": \"433\", \"name\": \"Eros\", \"diameter_km\": 16.84, \
             \"potentially_hazardous\": false}}]"
        );
    }

    #[test]
    fn test_write_to_json_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let catalog = create_catalog_with_unknowns();

        write_to_json(&path, catalog.approaches()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("\"diameter_km\": NaN").count(), 2);
        assert!(content.contains("\"designation\": \"2099 ZZ\", \"name\": \"\""));
        assert!(content.contains("\"potentially_hazardous\": true"));
        assert!(!content.contains("null"));
    }

    #[test]
    fn test_write_to_json_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");

        write_to_json(&path, std::iter::empty()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_json_round_trip_matches_csv_instants() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("out.json");
        let csv_path = dir.path().join("out.csv");
        let catalog = create_test_catalog();

        write_to_json(&json_path, catalog.approaches()).unwrap();
        write_to_csv(&csv_path, catalog.approaches()).unwrap();

        let records: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(records.len(), catalog.approach_count());

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());

        for ((record, row), approach) in records.iter().zip(&rows).zip(catalog.approaches()) {
            assert_eq!(record["neo"]["designation"], approach.designation());
            assert_eq!(&row[3], approach.designation());

            let json_time = NaiveDateTime::parse_from_str(
                record["datetime_utc"].as_str().unwrap(),
                "%Y-%m-%d %H:%M",
            )
            .unwrap();
            let csv_time = NaiveDateTime::parse_from_str(&row[0], "%Y-%m-%d %H:%M:%S").unwrap();
            assert_eq!(json_time, csv_time);
            assert_eq!(json_time, approach.time());
        }
    }

    #[derive(Deserialize)]
    struct ExportedApproach {
        datetime_utc: String,
        distance_au: f64,
        neo: ExportedNeo,
    }

    #[derive(Deserialize)]
    struct ExportedNeo {
        designation: String,
        name: String,
        diameter_km: f64,
        potentially_hazardous: bool,
    }

    #[test]
    fn test_json_round_trip_with_unknown_diameters() {
        init_logger();
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("unknowns.json");
        let csv_path = dir.path().join("unknowns.csv");
        let catalog = create_catalog_with_unknowns();

        write_to_json(&json_path, catalog.approaches()).unwrap();
        write_to_csv(&csv_path, catalog.approaches()).unwrap();

        // NaN is not a JSON token; JSON5 accepts it.
        let content = fs::read_to_string(&json_path).unwrap();
        let records: Vec<ExportedApproach> = json5::from_str(&content).unwrap();
        assert_eq!(records.len(), catalog.approach_count());

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());

        for ((record, row), approach) in records.iter().zip(&rows).zip(catalog.approaches()) {
            let neo = approach.neo().unwrap();
            assert_eq!(record.neo.designation, approach.designation());
            assert_eq!(record.neo.name, neo.name_or_empty());
            assert_eq!(record.neo.potentially_hazardous, neo.is_hazardous());
            assert_eq!(record.distance_au, approach.distance());
            assert!(record.neo.diameter_km.is_nan());

            let json_time =
                NaiveDateTime::parse_from_str(&record.datetime_utc, "%Y-%m-%d %H:%M").unwrap();
            let csv_time = NaiveDateTime::parse_from_str(&row[0], "%Y-%m-%d %H:%M:%S").unwrap();
            assert_eq!(json_time, csv_time);
            assert_eq!(json_time, approach.time());
        }

        assert_eq!(records[0].neo.name, "Apophis");
        assert_eq!(records[1].neo.designation, "2099 ZZ");
        assert_eq!(records[1].neo.name, "");
    }

    #[test]
    fn test_writes_are_idempotent() {
        let dir = tempdir().unwrap();
        let catalog = create_catalog_with_unknowns();

        for format in [OutputFormat::Csv, OutputFormat::Json] {
            let first = dir.path().join(format!("first.{:?}", format));
            let second = dir.path().join(format!("second.{:?}", format));
            write_approaches(&first, catalog.approaches(), format).unwrap();
            write_approaches(&second, catalog.approaches(), format).unwrap();
            assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
        }
    }

    #[test]
    fn test_unresolved_approach_is_rejected() {
        let dir = tempdir().unwrap();
        let unlinked = vec![approach("433", "2025-Jan-01 06:00", 0.1, 5.2)];

        for format in [OutputFormat::Csv, OutputFormat::Json] {
            let path = dir.path().join(format!("unlinked.{:?}", format));
            match write_approaches(&path, &unlinked, format) {
                Err(WriteError::UnresolvedApproach { designation }) => {
                    assert_eq!(designation, "433")
                }
                other => panic!("Expected UnresolvedApproach error, got {:?}", other),
            }
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subdir").join("nested").join("out.json");
        let catalog = create_test_catalog();

        write_to_json(&path, catalog.approaches()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a.csv")), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_path(Path::new("dir/a.JSON")), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_write_approaches_dispatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.data");
        let catalog = create_test_catalog();

        write_approaches(&path, catalog.approaches(), OutputFormat::Json).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("[{"));

        write_approaches(&path, catalog.approaches(), OutputFormat::Csv).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("datetime_utc,"));
    }
}
