use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Grid is missing header rows: expected 3, got {0}")]
    MissingHeaderRows(usize),

    #[error("Grid has no parseable period columns")]
    NoPeriodColumns,

    #[error("Invalid quarter code: {0}")]
    InvalidQuarter(String),

    #[error("Duplicate period key in comparison set: {0}")]
    DuplicatePeriodKey(String),

    #[error("Report configuration '{name}' is invalid: {details}")]
    InvalidConfig { name: String, details: String },

    #[error("Unknown line item: {0}")]
    UnknownLineItem(String),

    #[error("Category totals for {metric} in {period} do not reconcile: categorized {categorized} vs grand total {grand_total} (difference {difference})")]
    PartitionMismatch {
        metric: String,
        period: String,
        categorized: f64,
        grand_total: f64,
        difference: f64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
