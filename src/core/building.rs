use crate::core::meter_reading::MeterReading;
use crate::errors::ReadingError;
use crate::statistics::{describe, mean};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregate consumption figures for one building, serialized as one row of the summary table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryStats {
    pub building: String,
    pub total: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

#[derive(Clone, Debug)]
pub struct Building {
    name: String,
    readings: Vec<MeterReading>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            readings: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Readings in the order they were added.
    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    pub fn has_readings(&self) -> bool {
        !self.readings.is_empty()
    }

    pub fn add_reading(&mut self, timestamp: NaiveDateTime, kwh: f64) -> Result<(), ReadingError> {
        self.readings.push(MeterReading::new(timestamp, kwh)?);

        Ok(())
    }

    pub fn total_consumption(&self) -> f64 {
        self.readings.iter().map(MeterReading::kwh).sum()
    }

    /// Consumption summed per calendar day, covering every day from the first to the last reading.
    pub fn daily_totals(&self) -> BTreeMap<NaiveDate, f64> {
        let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for reading in &self.readings {
            *totals.entry(reading.timestamp().date()).or_default() += reading.kwh();
        }

        let (Some(&first), Some(&last)) = (totals.keys().next(), totals.keys().next_back()) else {
            return totals;
        };
        for day in first.iter_days().take_while(|day| *day <= last) {
            totals.entry(day).or_insert(0.);
        }

        totals
    }

    /// Mean reading per week, keyed by the Sunday that ends the week.
    ///
    /// Readings so close to the end of the calendar that their Sunday does not exist are left out.
    pub fn weekly_average(&self) -> BTreeMap<NaiveDate, f64> {
        let mut weeks: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for reading in &self.readings {
            let Some(week_end) = week_ending(reading.timestamp().date()) else {
                warn!(
                    "{}: no representable week ending for {}, leaving it out of weekly averages",
                    self.name,
                    reading.timestamp()
                );
                continue;
            };
            weeks.entry(week_end).or_default().push(reading.kwh());
        }

        weeks
            .into_iter()
            .filter_map(|(week_end, values)| mean(&values).map(|mean| (week_end, mean)))
            .collect()
    }

    /// None when the building has no readings, so it can be left out of aggregate reports.
    pub fn summary_stats(&self) -> Option<SummaryStats> {
        let values = self
            .readings
            .iter()
            .map(MeterReading::kwh)
            .collect::<Vec<_>>();
        let descriptive = describe(&values)?;

        Some(SummaryStats {
            building: self.name.clone(),
            total: descriptive.total,
            mean: descriptive.mean,
            max: descriptive.max,
            min: descriptive.min,
        })
    }
}

fn week_ending(date: NaiveDate) -> Option<NaiveDate> {
    let days_to_sunday = 7 - date.weekday().number_from_monday();
    date.checked_add_days(Days::new(days_to_sunday.into()))
}
