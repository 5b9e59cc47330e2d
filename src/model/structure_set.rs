//! Structure-set records built from parsed RTSTRUCT datasets.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::contour::ContourPolicy;
use super::metadata::{RecordMetadata, StructureSetMetadata};
use super::roi::{Roi, RoiSet};
use crate::dicom::{self, tags, Dataset, Modality};
use crate::error::RtscanError;

/// One RTSTRUCT record: its metadata and its ROIs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructureSet {
    metadata: StructureSetMetadata,
    rois: RoiSet,
}

impl StructureSet {
    /// Reads and builds a structure set from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, RtscanError> {
        Self::from_path_with(path, &ContourPolicy::default())
    }

    pub fn from_path_with(path: &Path, policy: &ContourPolicy) -> Result<Self, RtscanError> {
        ensure_regular_file(path)?;
        let dataset = dicom::open_dataset(path)?;
        Self::from_rtstruct_with(&dataset, policy)
    }

    /// Builds from a dataset after checking that it declares RTSTRUCT.
    pub fn from_rtstruct(dataset: &Dataset) -> Result<Self, RtscanError> {
        Self::from_rtstruct_with(dataset, &ContourPolicy::default())
    }

    pub fn from_rtstruct_with(
        dataset: &Dataset,
        policy: &ContourPolicy,
    ) -> Result<Self, RtscanError> {
        match dicom::dataset_modality(dataset) {
            Some(Modality::RtStruct) => Self::from_dataset_with(dataset, policy),
            Some(other) => Err(RtscanError::WrongModality {
                found: other.to_string(),
            }),
            None => Err(RtscanError::MissingAttribute { name: "Modality" }),
        }
    }

    /// Builds from a dataset without checking its modality.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, RtscanError> {
        Self::from_dataset_with(dataset, &ContourPolicy::default())
    }

    pub fn from_dataset_with(
        dataset: &Dataset,
        policy: &ContourPolicy,
    ) -> Result<Self, RtscanError> {
        let record = RecordMetadata::from_dataset(dataset);
        let roi_count = dicom::items(dataset, tags::STRUCTURE_SET_ROI_SEQUENCE)
            .ok_or(RtscanError::MissingAttribute {
                name: "StructureSetROISequence",
            })?
            .len();

        let metadata = StructureSetMetadata {
            record,
            roi_count,
            referenced_series_uid: dicom::referenced_series_uid(dataset),
        };
        let rois = RoiSet::from_rtstruct(dataset, policy)?;

        tracing::debug!(
            declared = roi_count,
            built = rois.len(),
            "Built structure set"
        );

        Ok(Self { metadata, rois })
    }

    pub fn metadata(&self) -> &StructureSetMetadata {
        &self.metadata
    }

    pub fn rois(&self) -> &RoiSet {
        &self.rois
    }

    pub fn roi_names(&self) -> Vec<&str> {
        self.rois.roi_names()
    }

    pub fn roi(&self, name: &str) -> Option<&Roi> {
        self.rois.get(name)
    }
}

/// Fails with `FileNotFound` or `NotAFile` unless `path` is a regular file.
pub(crate) fn ensure_regular_file(path: &Path) -> Result<(), RtscanError> {
    let meta = std::fs::metadata(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => RtscanError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => RtscanError::Io(err),
    })?;
    if !meta.is_file() {
        return Err(RtscanError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

impl fmt::Display for StructureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.metadata)?;
        write!(f, "ROIs: {}", self.roi_names().join(", "))
    }
}
