//! The unified dataset: every row that survived ingestion, across all input files.

use crate::core::meter_reading::{parse_kwh, MeterReading};
use crate::errors::ReadingError;
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;
use std::io::Write;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const KWH_COLUMN: &str = "kwh";
pub const BUILDING_NAME_COLUMN: &str = "Building_Name";

/// One ingested row, tagged with the building it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingRecord {
    pub timestamp: NaiveDateTime,
    /// The kwh cell exactly as it appeared in the input file.
    pub raw_kwh: String,
    pub building_name: String,
    /// Any other columns of the input file, by name.
    pub extra: IndexMap<String, String>,
}

impl ReadingRecord {
    pub fn kwh(&self) -> Result<f64, ReadingError> {
        parse_kwh(&self.raw_kwh)
    }

    pub fn to_meter_reading(&self) -> Result<MeterReading, ReadingError> {
        MeterReading::new(self.timestamp, self.kwh()?)
    }

    fn cell(&self, column: &str) -> String {
        match column {
            TIMESTAMP_COLUMN => self.timestamp.to_string(),
            KWH_COLUMN => self.raw_kwh.clone(),
            BUILDING_NAME_COLUMN => self.building_name.clone(),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }
}

/// The highest combined consumption at a single timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakLoad {
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
}

#[derive(Clone, Debug, Default)]
pub struct UnifiedDataset {
    columns: IndexSet<String>,
    records: Vec<ReadingRecord>,
}

impl UnifiedDataset {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append the rows of one file. Columns not seen before are added after the existing ones.
    pub fn append(&mut self, file_columns: &[String], records: Vec<ReadingRecord>) {
        for column in file_columns
            .iter()
            .map(String::as_str)
            .chain([BUILDING_NAME_COLUMN])
        {
            if !self.columns.contains(column) {
                self.columns.insert(column.to_string());
            }
        }
        self.records.extend(records);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn records(&self) -> &[ReadingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumption summed across all buildings at each timestamp.
    ///
    /// Rows whose kwh would not be accepted as a meter reading are left out.
    pub fn load_by_timestamp(&self) -> BTreeMap<NaiveDateTime, f64> {
        let mut load_by_timestamp: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
        for reading in self
            .records
            .iter()
            .filter_map(|record| record.to_meter_reading().ok())
        {
            *load_by_timestamp.entry(reading.timestamp()).or_default() += reading.kwh();
        }

        load_by_timestamp
    }

    /// The timestamp with the highest combined load. Where several timestamps share it, the
    /// earliest wins.
    pub fn peak_load(&self) -> Option<PeakLoad> {
        self.load_by_timestamp()
            .into_iter()
            .fold(None, |peak: Option<PeakLoad>, (timestamp, kwh)| match peak {
                Some(peak) if peak.kwh >= kwh => Some(peak),
                _ => Some(PeakLoad { timestamp, kwh }),
            })
    }

    pub fn write_csv(&self, writer: impl Write) -> anyhow::Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }

        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(self.columns())?;
        for record in &self.records {
            writer.write_record(self.columns().map(|column| record.cell(column)))?;
        }
        writer.flush()?;

        Ok(())
    }
}
