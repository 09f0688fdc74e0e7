use std::path::PathBuf;
use thiserror::Error;

use crate::roi::kind::shape_label;

/// The main error type for ROI decoding and encoding.
#[derive(Debug, Error)]
pub enum RoiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad magic or a record that ends before all of its fields were read.
    #[error("Invalid ROI record: {message}")]
    Format { message: String },

    #[error("ROI type {code} ({}) not supported for {operation}", label(.code))]
    UnsupportedShape { code: u8, operation: &'static str },

    #[error("ROI subtype {0} not supported (only subtype 0 is understood)")]
    UnsupportedSubtype(u16),

    #[error("Unsupported ROI feature: {0}")]
    UnsupportedFeature(String),

    #[error("A name is required to write an ROI")]
    MissingName,

    #[error("Cannot write an ROI with no points")]
    EmptyPoints,

    #[error(
        "Value {value} for field '{field}' does not fit in {width} {} byte(s)",
        signedness(.signed)
    )]
    ValueOutOfRange {
        field: &'static str,
        value: i64,
        width: usize,
        signed: bool,
    },

    #[error("Zip archive error in {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry '{entry}': {source}")]
    ArchiveEntry {
        entry: String,
        #[source]
        source: Box<RoiError>,
    },

    #[error("Failed to parse point sets from {path}: {source}")]
    PointsJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize ROI report as JSON: {0}")]
    ReportJsonWrite(#[source] serde_json::Error),

    #[error("Failed to scan ROI directory {path}: {message}")]
    RoiDirInvalid { path: PathBuf, message: String },

    #[error("Failed to write CSV: {0}")]
    CsvWrite(#[from] csv::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

fn label(code: &u8) -> &'static str {
    shape_label(*code)
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}

impl RoiError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        RoiError::Format {
            message: message.into(),
        }
    }

    pub(crate) fn in_entry(self, entry: impl Into<String>) -> Self {
        RoiError::ArchiveEntry {
            entry: entry.into(),
            source: Box::new(self),
        }
    }
}
