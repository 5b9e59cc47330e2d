//! Batch construction of structure sets from discovered paths.
//!
//! Each path gets a cheap modality check first; readable records of another
//! modality are skipped with a warning. The rest are built with
//! [`StructureSet::from_path_with`]. What happens on the first failure is
//! the caller's choice via [`BatchPolicy`].

pub mod report;

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use serde::Serialize;

use crate::dicom::{self, Modality};
use crate::error::RtscanError;
use crate::model::structure_set::ensure_regular_file;
use crate::model::{ContourPolicy, StructureSet};

pub use report::{BatchReport, StructureSetSummary};

/// What to do when one file fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Stop at the first failure and return it.
    #[default]
    Abort,
    /// Record the failure and carry on with the next file.
    Continue,
}

/// Options for [`load_structure_sets`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BatchOptions {
    pub policy: BatchPolicy,
    pub contour_policy: ContourPolicy,
}

/// A structure set and the file it came from.
#[derive(Clone, Debug, Serialize)]
pub struct LoadedStructureSet {
    pub path: PathBuf,
    pub structure_set: StructureSet,
}

/// A file passed over because it is not an RTSTRUCT record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub modality: Modality,
}

/// A file that failed under [`BatchPolicy::Continue`].
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: RtscanError,
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub loaded: Vec<LoadedStructureSet>,
    pub skipped: Vec<SkippedRecord>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn structure_sets(&self) -> impl Iterator<Item = &StructureSet> {
        self.loaded.iter().map(|loaded| &loaded.structure_set)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Loaded {
    Set(StructureSet),
    Skipped(Modality),
}

/// Builds one structure set per path, in order.
pub fn load_structure_sets<P: AsRef<Path>>(
    paths: &[P],
    options: &BatchOptions,
    progress: Option<&ProgressBar>,
) -> Result<BatchOutcome, RtscanError> {
    let mut outcome = BatchOutcome::default();
    if let Some(pb) = progress {
        pb.set_length(paths.len() as u64);
    }

    for path in paths {
        let path = path.as_ref();
        match load_one(path, &options.contour_policy) {
            Ok(Loaded::Set(structure_set)) => outcome.loaded.push(LoadedStructureSet {
                path: path.to_path_buf(),
                structure_set,
            }),
            Ok(Loaded::Skipped(modality)) => {
                tracing::warn!(
                    "Skipping {}: modality is {modality}, not RTSTRUCT",
                    path.display()
                );
                outcome.skipped.push(SkippedRecord {
                    path: path.to_path_buf(),
                    modality,
                });
            }
            Err(error) => {
                tracing::error!("Error processing file {}: {error}", path.display());
                match options.policy {
                    BatchPolicy::Abort => {
                        return Err(RtscanError::Batch {
                            path: path.to_path_buf(),
                            source: Box::new(error),
                        });
                    }
                    BatchPolicy::Continue => outcome.failures.push(BatchFailure {
                        path: path.to_path_buf(),
                        error,
                    }),
                }
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    tracing::info!(
        loaded = outcome.loaded.len(),
        skipped = outcome.skipped.len(),
        failed = outcome.failures.len(),
        "Batch finished"
    );
    Ok(outcome)
}

fn load_one(path: &Path, policy: &ContourPolicy) -> Result<Loaded, RtscanError> {
    ensure_regular_file(path)?;
    let modality = dicom::read_modality(path)?;
    if modality != Modality::RtStruct {
        return Ok(Loaded::Skipped(modality));
    }
    StructureSet::from_path_with(path, policy).map(Loaded::Set)
}
