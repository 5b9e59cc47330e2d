//! Batch report types and terminal formatting.
//!
//! A [`BatchReport`] summarizes a [`BatchOutcome`] for display. It renders
//! as text via `Display` or as JSON via `serde`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::{BatchOutcome, SkippedRecord};
use crate::scan::ScanOutcome;

/// Summary of a scan followed by a batch load.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    /// Number of RTSTRUCT files found by the scan.
    pub found: usize,
    /// Seconds spent scanning.
    pub scan_seconds: f64,
    pub loaded: Vec<StructureSetSummary>,
    pub skipped: Vec<SkippedRecord>,
    pub failures: Vec<FailureSummary>,
}

/// One loaded structure set.
#[derive(Clone, Debug, Serialize)]
pub struct StructureSetSummary {
    pub path: PathBuf,
    /// Declared ROI count, including ROIs dropped for lack of geometry.
    pub num_rois: usize,
    pub roi_names: Vec<String>,
    pub referenced_series_uid: Option<String>,
}

/// One file that failed to load.
#[derive(Clone, Debug, Serialize)]
pub struct FailureSummary {
    pub path: PathBuf,
    pub message: String,
}

impl BatchReport {
    pub fn new(scan: &ScanOutcome, batch: &BatchOutcome) -> Self {
        let loaded = batch
            .loaded
            .iter()
            .map(|loaded| {
                let set = &loaded.structure_set;
                StructureSetSummary {
                    path: loaded.path.clone(),
                    num_rois: set.metadata().roi_count,
                    roi_names: set.roi_names().into_iter().map(str::to_string).collect(),
                    referenced_series_uid: set.metadata().referenced_series_uid.clone(),
                }
            })
            .collect();

        let failures = batch
            .failures
            .iter()
            .map(|failure| FailureSummary {
                path: failure.path.clone(),
                message: failure.error.to_string(),
            })
            .collect();

        Self {
            found: scan.paths.len(),
            scan_seconds: scan.elapsed.as_secs_f64(),
            loaded,
            skipped: batch.skipped.clone(),
            failures,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Found {} RTSTRUCT file(s) in {:.2}s",
            self.found, self.scan_seconds
        )?;
        writeln!(
            f,
            "Loaded {} structure set(s), skipped {}, failed {}",
            self.loaded.len(),
            self.skipped.len(),
            self.failures.len()
        )?;

        if !self.loaded.is_empty() {
            writeln!(f)?;
            for summary in &self.loaded {
                writeln!(f, "  {}", summary)?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            for failure in &self.failures {
                writeln!(f, "  [ERROR] {}: {}", failure.path.display(), failure.message)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for StructureSetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} ROI(s)): {}",
            self.path.display(),
            self.num_rois,
            self.roi_names.join(", ")
        )
    }
}
