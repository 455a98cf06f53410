#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident dataset loading and filtering.
//!
//! Parses the incident CSV into immutable [`Incident`] records, keeps the
//! parsed dataset in a [`cache::DatasetCache`] that reloads after a short
//! expiry window, and narrows it with the dashboard controls in
//! [`filter`].
//!
//! The CSV uses the original dataset's Portuguese headers (`data`,
//! `tipo_crime`, `rua`, `bairro`, `latitude`, `longitude`, `severidade`);
//! the English names (`timestamp`, `category`, `street`, `neighborhood`,
//! `severity`) are accepted as aliases.

pub mod cache;
pub mod filter;
pub mod parsing;

use std::io::Read;
use std::path::{Path, PathBuf};

use crime_watch_incident_models::Incident;
use serde::Deserialize;
use thiserror::Error;

use crate::parsing::{clean_label, parse_timestamp};

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Dataset path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV has no timestamp column.
    #[error("CSV is missing the required '{0}' column")]
    MissingColumn(&'static str),
}

/// A loaded incident collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Incidents in file order.
    pub incidents: Vec<Incident>,
    /// Rows dropped because their timestamp was missing or unparseable.
    pub skipped_rows: usize,
}

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "data", alias = "timestamp", default)]
    timestamp: Option<String>,
    #[serde(rename = "tipo_crime", alias = "category", default)]
    category: Option<String>,
    #[serde(rename = "rua", alias = "street", default)]
    street: Option<String>,
    #[serde(rename = "bairro", alias = "neighborhood", default)]
    neighborhood: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(
        rename = "severidade",
        alias = "severity",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    severity: Option<f64>,
}

/// Loads the dataset from a CSV file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened or the CSV cannot
/// be read.
pub fn load_csv(path: &Path) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_csv_reader(file)?;

    log::info!(
        "Loaded {} incidents from {} ({} rows skipped)",
        dataset.incidents.len(),
        path.display(),
        dataset.skipped_rows
    );

    Ok(dataset)
}

/// Loads the dataset from any CSV byte stream.
///
/// Rows without a parseable timestamp are dropped and counted. Empty or
/// non-numeric coordinates and severities load as `None`; those incidents
/// are kept and later skipped by distance computations.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if there is no timestamp
/// column, or [`DatasetError::Csv`] if the CSV structure is unreadable.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let has_timestamp = reader
        .headers()?
        .iter()
        .any(|h| h == "data" || h == "timestamp");
    if !has_timestamp {
        return Err(DatasetError::MissingColumn("data"));
    }

    let mut dataset = Dataset::default();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;

        let Some(timestamp) = row.timestamp.as_deref().and_then(parse_timestamp) else {
            log::warn!(
                "Skipping CSV row {}: unparseable timestamp {:?}",
                line + 2,
                row.timestamp.unwrap_or_default()
            );
            dataset.skipped_rows += 1;
            continue;
        };

        dataset.incidents.push(Incident {
            timestamp,
            latitude: row.latitude,
            longitude: row.longitude,
            category: clean_label(row.category),
            street: clean_label(row.street),
            neighborhood: clean_label(row.neighborhood),
            severity: row.severity,
        });
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use crime_watch_incident_models::Geolocated as _;

    use super::*;

    const SAMPLE: &str = "\
data,tipo_crime,rua,bairro,latitude,longitude,severidade
2025-03-14 21:05:00,Roubo,Rua A,Centro,-8.283,-35.030,4
2025-03-13,Furto,Rua B,Gaibu,-8.336,-34.944,
not-a-date,Assalto,Rua C,Centro,-8.28,-35.03,3
2025-03-12 08:00:00,Assalto, Rua D ,Pontezinha,,-35.063,5
2025-03-11 10:30:00,Furto,Rua E,Suape,abc,-34.956,2
";

    #[test]
    fn loads_rows_and_skips_bad_timestamps() {
        let dataset = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.incidents.len(), 4);
        assert_eq!(dataset.skipped_rows, 1);

        let first = &dataset.incidents[0];
        assert_eq!(first.category, "Roubo");
        assert_eq!(first.street, "Rua A");
        assert_eq!(first.neighborhood, "Centro");
        assert_eq!(first.severity, Some(4.0));
        assert!(first.location().is_some());
    }

    #[test]
    fn empty_severity_loads_as_none() {
        let dataset = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.incidents[1].severity, None);
        assert_eq!(dataset.incidents[1].timestamp.to_string(), "2025-03-13 00:00:00");
    }

    #[test]
    fn dirty_coordinates_are_kept_without_location() {
        let dataset = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let missing = &dataset.incidents[2];
        assert_eq!(missing.street, "Rua D");
        assert_eq!(missing.latitude, None);
        assert!(missing.location().is_none());

        let garbage = &dataset.incidents[3];
        assert_eq!(garbage.latitude, None);
        assert_eq!(garbage.longitude, Some(-34.956));
    }

    #[test]
    fn accepts_english_headers() {
        let csv = "\
timestamp,category,street,neighborhood,latitude,longitude,severity
2025-01-01T12:00:00,Robbery,Main St,Downtown,-8.283,-35.03,2
";
        let dataset = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.incidents.len(), 1);
        assert_eq!(dataset.incidents[0].category, "Robbery");
        assert_eq!(dataset.incidents[0].neighborhood, "Downtown");
    }

    #[test]
    fn missing_optional_columns_default() {
        let csv = "data,latitude,longitude\n2025-01-01,-8.283,-35.03\n";
        let dataset = load_csv_reader(csv.as_bytes()).unwrap();
        let incident = &dataset.incidents[0];
        assert_eq!(incident.category, "");
        assert_eq!(incident.severity, None);
        assert!(incident.location().is_some());
    }

    #[test]
    fn missing_timestamp_column_is_an_error() {
        let csv = "tipo_crime,latitude,longitude\nRoubo,-8.283,-35.03\n";
        assert!(matches!(
            load_csv_reader(csv.as_bytes()),
            Err(DatasetError::MissingColumn("data"))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_csv(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with("I/O error reading does/not/exist.csv: ")
        );
    }
}
