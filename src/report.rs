//! Report generation: cleaned data export, per-building summary table, trend tables and
//! the executive text report.

use crate::core::building::SummaryStats;
use crate::core::building_manager::BuildingManager;
use crate::dataset::{PeakLoad, UnifiedDataset};
use crate::output::Output;
use chrono::{NaiveDate, NaiveDateTime};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

pub const CLEANED_DATA_KEY: &str = "cleaned_energy_data";
pub const BUILDING_SUMMARY_KEY: &str = "building_summary";
pub const DAILY_TOTALS_KEY: &str = "daily_totals";
pub const WEEKLY_AVERAGES_KEY: &str = "weekly_averages";
pub const EXECUTIVE_SUMMARY_KEY: &str = "summary";

const SUMMARY_HEADINGS: [&str; 5] = [
    "Building",
    "Total (kwh)",
    "Mean (kwh)",
    "Max (kwh)",
    "Min (kwh)",
];
const DAILY_TOTAL_HEADINGS: [&str; 3] = ["Building", "Date", "Total (kwh)"];
const WEEKLY_AVERAGE_HEADINGS: [&str; 3] = ["Building", "Week Ending", "Mean (kwh)"];

#[derive(Debug, Serialize)]
struct DailyTotalRow<'a> {
    building: &'a str,
    date: NaiveDate,
    total: f64,
}

#[derive(Debug, Serialize)]
struct WeeklyAverageRow<'a> {
    building: &'a str,
    week_ending: NaiveDate,
    mean: f64,
}

/// Figures shown in the first two sections of the executive report.
#[derive(Clone, Debug, PartialEq)]
pub struct CampusHighlights {
    pub total_consumption: f64,
    pub peak_load: Option<PeakLoad>,
    pub highest_consumer: SummaryStats,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecutiveSummary {
    /// None when no building had any readings.
    pub highlights: Option<CampusHighlights>,
    pub buildings_analyzed: usize,
    pub records_processed: usize,
}

impl ExecutiveSummary {
    pub fn new(summary_table: &[SummaryStats], dataset: &UnifiedDataset) -> Self {
        let highlights = highest_consumer(summary_table).map(|highest_consumer| CampusHighlights {
            total_consumption: summary_table.iter().map(|row| row.total).sum(),
            peak_load: dataset.peak_load(),
            highest_consumer: highest_consumer.clone(),
        });

        Self {
            highlights,
            buildings_analyzed: summary_table.len(),
            records_processed: dataset.len(),
        }
    }

    pub fn render(&self, generated_at: NaiveDateTime) -> String {
        let mut report = format!(
            "\nCAMPUS ENERGY ANALYSIS REPORT\n\
             =============================\n\
             Date Generated: {}\n\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        );

        match &self.highlights {
            Some(highlights) => {
                let peak = match &highlights.peak_load {
                    Some(peak) => format!(
                        "{} kwh occurred at {}",
                        format_kwh(peak.kwh),
                        peak.timestamp
                    ),
                    None => "unavailable".to_string(),
                };
                let highest = &highlights.highest_consumer;
                report.push_str(&format!(
                    "1. GLOBAL STATISTICS\n\
                     --------------------\n\
                     Total Campus Consumption: {} kwh\n\
                     Peak Campus Load: {peak}\n\n\
                     2. BUILDING HIGHLIGHTS\n\
                     ----------------------\n\
                     Highest Consuming Building: {}\n   \
                     - Total Usage: {} kwh\n   \
                     - Average Hourly Usage: {:.2} kwh\n\n",
                    format_kwh(highlights.total_consumption),
                    highest.building,
                    format_kwh(highest.total),
                    highest.mean,
                ));
            }
            None => report.push_str(
                "1. GLOBAL STATISTICS\n\
                 --------------------\n\
                 No building readings were available.\n\n\
                 2. BUILDING HIGHLIGHTS\n\
                 ----------------------\n\
                 No building readings were available.\n\n",
            ),
        }

        report.push_str(&format!(
            "3. DATA SUMMARY\n\
             ---------------\n\
             Total Buildings Analyzed: {}\n\
             Data Records Processed: {}\n",
            self.buildings_analyzed, self.records_processed
        ));

        report
    }
}

/// Summary statistics for every building that has at least one reading, in manager order.
pub fn summary_table(manager: &BuildingManager) -> Vec<SummaryStats> {
    manager
        .list_buildings()
        .filter_map(|building| building.summary_stats())
        .collect()
}

fn highest_consumer(summary_table: &[SummaryStats]) -> Option<&SummaryStats> {
    summary_table
        .iter()
        .fold(None, |highest: Option<&SummaryStats>, row| match highest {
            Some(highest) if highest.total >= row.total => Some(highest),
            _ => Some(row),
        })
}

/// Write every report for a populated manager and the dataset it was populated from.
pub fn generate_summary_report(
    manager: &BuildingManager,
    dataset: &UnifiedDataset,
    output: impl Output,
    generated_at: NaiveDateTime,
) -> anyhow::Result<ExecutiveSummary> {
    let summary = summary_table(manager);
    let executive_summary = ExecutiveSummary::new(&summary, dataset);

    if output.is_noop() {
        return Ok(executive_summary);
    }

    write_location(&output, CLEANED_DATA_KEY, "csv", "Saved cleaned data", |writer| {
        dataset.write_csv(writer)
    })?;
    write_location(&output, BUILDING_SUMMARY_KEY, "csv", "Saved summary stats", |writer| {
        write_summary_table(&summary, writer)
    })?;
    write_location(&output, DAILY_TOTALS_KEY, "csv", "Saved daily totals", |writer| {
        write_daily_totals(manager, writer)
    })?;
    write_location(&output, WEEKLY_AVERAGES_KEY, "csv", "Saved weekly averages", |writer| {
        write_weekly_averages(manager, writer)
    })?;
    write_location(
        &output,
        EXECUTIVE_SUMMARY_KEY,
        "txt",
        "Executive summary written",
        |writer| {
            writer.write_all(executive_summary.render(generated_at).as_bytes())?;
            writer.flush()?;
            Ok(())
        },
    )?;

    Ok(executive_summary)
}

fn write_location<O: Output>(
    output: &O,
    location_key: &str,
    file_extension: &str,
    message: &str,
    write: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key(location_key, file_extension)?;
    write(&mut writer)?;
    info!(
        "{message} to {}",
        output.describe_location(location_key, file_extension)
    );

    Ok(())
}

pub fn write_summary_table(summary: &[SummaryStats], writer: impl Write) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(SUMMARY_HEADINGS)?;
    for row in summary {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_daily_totals(manager: &BuildingManager, writer: impl Write) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(DAILY_TOTAL_HEADINGS)?;
    for building in manager.list_buildings() {
        for (date, total) in building.daily_totals() {
            writer.serialize(DailyTotalRow {
                building: building.name(),
                date,
                total,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}

pub fn write_weekly_averages(manager: &BuildingManager, writer: impl Write) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(WEEKLY_AVERAGE_HEADINGS)?;
    for building in manager.list_buildings() {
        for (week_ending, mean) in building.weekly_average() {
            writer.serialize(WeeklyAverageRow {
                building: building.name(),
                week_ending,
                mean,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}

/// Format with two decimal places and thousands separators, e.g. `12,345.60`.
pub fn format_kwh(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{fraction}")
}
