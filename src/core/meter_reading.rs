use crate::errors::ReadingError;
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};

/// One energy consumption observation for a building.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterReading {
    timestamp: NaiveDateTime,
    kwh: f64,
}

impl MeterReading {
    pub fn new(timestamp: NaiveDateTime, kwh: f64) -> Result<Self, ReadingError> {
        if !kwh.is_finite() {
            return Err(ReadingError::NonFinite(kwh));
        }
        if kwh < 0. {
            return Err(ReadingError::Negative(kwh));
        }

        Ok(Self { timestamp, kwh })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn kwh(&self) -> f64 {
        self.kwh
    }
}

impl Display for MeterReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "reading({}, {} kwh)", self.timestamp, self.kwh)
    }
}

/// Coerce a raw kwh cell into a number.
pub fn parse_kwh(value: &str) -> Result<f64, ReadingError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ReadingError::NotNumeric(value.to_string()))
}
