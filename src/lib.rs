pub mod core;
pub mod dataset;
pub mod errors;
pub mod ingest;
pub mod loader;
pub mod output;
pub mod report;
mod statistics;

pub use crate::core::building::{Building, SummaryStats};
pub use crate::core::building_manager::BuildingManager;
pub use crate::core::meter_reading::MeterReading;
pub use crate::dataset::{ReadingRecord, UnifiedDataset};
use crate::ingest::ingest_directory;
use crate::loader::populate;
use crate::output::Output;
use crate::report::{generate_summary_report, ExecutiveSummary};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::info;

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// What a dashboard run did, for callers that want more than the written reports.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRun {
    pub files_found: usize,
    pub invalid_timestamps: usize,
    pub malformed_rows: usize,
    pub rejected_readings: usize,
    pub summary: ExecutiveSummary,
}

/// Ingest every CSV in `input_dir`, populate `manager` from it and write all reports to `output`.
pub fn run_dashboard(
    input_dir: &Path,
    output: impl Output,
    manager: &mut BuildingManager,
    generated_at: NaiveDateTime,
) -> anyhow::Result<DashboardRun> {
    let ingestion = ingest_directory(input_dir)?;
    if ingestion.dataset.is_empty() {
        info!("No data ingested; reports will be empty");
    }

    let population = populate(manager, &ingestion.dataset);
    let summary = generate_summary_report(manager, &ingestion.dataset, output, generated_at)?;

    Ok(DashboardRun {
        files_found: ingestion.files_found(),
        invalid_timestamps: ingestion.invalid_timestamps(),
        malformed_rows: ingestion.malformed_rows(),
        rejected_readings: population.rejected,
        summary,
    })
}
