//! Ingestion of a directory of per-building meter CSV files into one unified dataset.
//!
//! Each file is ingested independently: a file with a bad schema or an unreadable body is
//! skipped and reported, and never stops the remaining files from loading. Within a file,
//! malformed rows and rows with unparseable timestamps are dropped and counted.

use crate::dataset::{
    ReadingRecord, UnifiedDataset, BUILDING_NAME_COLUMN, KWH_COLUMN, TIMESTAMP_COLUMN,
};
use crate::errors::IngestError;
use anyhow::Context;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
// chrono accepts signed extended years, which calendar arithmetic cannot always represent
const ACCEPTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Counts for a file that was ingested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    pub rows: usize,
    pub invalid_timestamps: usize,
    pub malformed_rows: usize,
}

/// The rows of a single file, before they join the unified dataset.
#[derive(Clone, Debug)]
pub struct FileTable {
    pub columns: Vec<String>,
    pub records: Vec<ReadingRecord>,
    pub stats: FileStats,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub result: Result<FileStats, IngestError>,
}

#[derive(Debug, Default)]
pub struct Ingestion {
    pub dataset: UnifiedDataset,
    /// One entry per discovered file, in discovery order.
    pub files: Vec<FileOutcome>,
}

impl Ingestion {
    pub fn files_found(&self) -> usize {
        self.files.len()
    }

    pub fn invalid_timestamps(&self) -> usize {
        self.loaded_stats().map(|stats| stats.invalid_timestamps).sum()
    }

    pub fn malformed_rows(&self) -> usize {
        self.loaded_stats().map(|stats| stats.malformed_rows).sum()
    }

    fn loaded_stats(&self) -> impl Iterator<Item = &FileStats> {
        self.files
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }
}

/// Ingest every CSV file found directly inside `directory`.
///
/// A directory that does not exist, or holds no CSV files, gives an empty dataset.
pub fn ingest_directory(directory: &Path) -> anyhow::Result<Ingestion> {
    let files = match discover_csv_files(directory) {
        Ok(files) => files,
        Err(e) if e.kind() == ErrorKind::NotFound => vec![],
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Could not list input directory {}", directory.display())
            })
        }
    };

    if files.is_empty() {
        warn!("No CSV files found in {}", directory.display());
        return Ok(Default::default());
    }

    info!(
        "Found {} files in {}. Starting ingestion...",
        files.len(),
        directory.display()
    );

    let mut ingestion = Ingestion::default();
    for path in files {
        let file_name = display_file_name(&path);
        let building_name = building_name_for(&path);

        let result = ingest_file(&path, &building_name).map(|table| {
            log_loaded_file(&file_name, &table.stats);
            let stats = table.stats;
            if !table.records.is_empty() {
                ingestion.dataset.append(&table.columns, table.records);
            }
            stats
        });

        match &result {
            Ok(_) => {}
            Err(e) if e.is_schema_skip() => warn!("Skipping {file_name}: {e}"),
            Err(e) => error!("Failed to process {file_name}: {e}"),
        }

        ingestion.files.push(FileOutcome { file_name, result });
    }

    Ok(ingestion)
}

fn log_loaded_file(file_name: &str, stats: &FileStats) {
    if stats.invalid_timestamps > 0 {
        info!(
            "Dropped {} rows with invalid dates in {file_name}",
            stats.invalid_timestamps
        );
    }
    if stats.malformed_rows > 0 {
        warn!(
            "Skipped {} malformed rows in {file_name}",
            stats.malformed_rows
        );
    }
    info!("Loaded {file_name} ({} rows)", stats.rows);
}

fn discover_csv_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

fn building_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn ingest_file(path: &Path, building_name: &str) -> Result<FileTable, IngestError> {
    ingest_csv(BufReader::new(File::open(path)?), building_name)
}

/// Read one building's CSV, keeping every row that has a parseable timestamp.
pub fn ingest_csv(input: impl Read, building_name: &str) -> Result<FileTable, IngestError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);

    let columns = reader
        .headers()?
        .iter()
        .map(normalise_header_name)
        .collect::<Vec<_>>();

    let column_index = |name: &str| columns.iter().position(|column| column == name);
    let (Some(timestamp_idx), Some(kwh_idx)) =
        (column_index(TIMESTAMP_COLUMN), column_index(KWH_COLUMN))
    else {
        let missing = [TIMESTAMP_COLUMN, KWH_COLUMN]
            .into_iter()
            .filter(|required| column_index(*required).is_none())
            .map(str::to_string)
            .collect();
        return Err(IngestError::MissingColumns { missing });
    };

    let mut records = vec![];
    let mut stats = FileStats::default();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;

        if record.len() > columns.len() {
            // +2: 1-based, plus the header line
            debug!(
                "{building_name}: line {} has {} fields, expected at most {}",
                idx + 2,
                record.len(),
                columns.len()
            );
            stats.malformed_rows += 1;
            continue;
        }

        let Some(timestamp) = record.get(timestamp_idx).and_then(parse_timestamp) else {
            stats.invalid_timestamps += 1;
            continue;
        };

        records.push(ReadingRecord {
            timestamp,
            raw_kwh: record.get(kwh_idx).unwrap_or_default().trim().to_string(),
            building_name: building_name.to_string(),
            extra: extra_cells(&record, &columns, &[timestamp_idx, kwh_idx]),
        });
    }

    stats.rows = records.len();

    Ok(FileTable {
        columns,
        records,
        stats,
    })
}

fn extra_cells(
    record: &StringRecord,
    columns: &[String],
    skip: &[usize],
) -> IndexMap<String, String> {
    columns
        .iter()
        .enumerate()
        .filter(|(idx, column)| !skip.contains(idx) && column.as_str() != BUILDING_NAME_COLUMN)
        .map(|(idx, column)| {
            (
                column.clone(),
                record.get(idx).unwrap_or_default().to_string(),
            )
        })
        .collect()
}

fn normalise_header_name(name: &str) -> String {
    // spreadsheet exports often prefix the first header with a UTF-8 BOM
    name.trim_start_matches('\u{feff}').trim().to_string()
}

/// Parse a timestamp cell, returning None for anything that is not a recognised date or date-time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .map(|with_offset| with_offset.naive_local())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .filter(|timestamp| ACCEPTED_YEARS.contains(&timestamp.year()))
}
