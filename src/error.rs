use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The main error type for rtscan operations.
#[derive(Debug, Error)]
pub enum RtscanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("{} is not a file", path.display())]
    NotAFile { path: PathBuf },

    #[error("Invalid file name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Unexpected error walking {}: {source}", root.display())]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read DICOM file {}: {source}", path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: Box<dicom_object::ReadError>,
    },

    #[error("Expected an RTSTRUCT dataset, found modality '{found}'")]
    WrongModality { found: String },

    #[error("Missing DICOM attribute {name}")]
    MissingAttribute { name: &'static str },

    #[error("Invalid value for DICOM attribute {name}: {message}")]
    InvalidValue { name: &'static str, message: String },

    #[error(
        "ContourData for ROI '{roi}' slice {slice} has {len} value(s), which is not a multiple of 3"
    )]
    MalformedContourData {
        roi: String,
        slice: usize,
        len: usize,
    },

    #[error("ROI number {number} not found in ROIContourSequence")]
    RoiNotFound { number: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Worker scanning {} panicked: {message}", root.display())]
    WorkerPanicked { root: PathBuf, message: String },

    #[error("Scanning {}: {source}", root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: Box<RtscanError>,
    },

    #[error("Scan timed out after {elapsed:?} with {finished} of {total} root(s) finished")]
    ScanTimedOut {
        elapsed: Duration,
        finished: usize,
        total: usize,
    },

    #[error("Error processing file {}: {source}", path.display())]
    Batch {
        path: PathBuf,
        #[source]
        source: Box<RtscanError>,
    },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl RtscanError {
    pub(crate) fn invalid_format(path: impl Into<PathBuf>, source: dicom_object::ReadError) -> Self {
        RtscanError::InvalidFormat {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
