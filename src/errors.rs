use thiserror::Error;

/// Reasons a single input file contributes no rows to the unified dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Missing columns {}", format_missing_columns(.missing))]
    MissingColumns { missing: Vec<String> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl IngestError {
    /// Whether this is an expected schema skip rather than an unexpected fault.
    pub fn is_schema_skip(&self) -> bool {
        matches!(self, Self::MissingColumns { .. })
    }
}

fn format_missing_columns(missing: &[String]) -> String {
    let quoted = missing
        .iter()
        .map(|column| format!("'{column}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{quoted}}}")
}

/// An energy value that cannot become a meter reading.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReadingError {
    #[error("kwh value '{0}' is not numeric")]
    NotNumeric(String),
    #[error("kwh value {0} is not finite")]
    NonFinite(f64),
    #[error("kwh value {0} is negative")]
    Negative(f64),
}
