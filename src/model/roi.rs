//! Regions of interest and their cross-referenced contour records.

use std::fmt;

use serde::Serialize;

use super::contour::{extract_contours, ContourPolicy, ContourSlice};
use crate::dicom::{self, tags, Dataset};
use crate::error::RtscanError;

/// The ROINumber of a structure, guaranteed non-negative.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RoiNumber(u32);

impl RoiNumber {
    /// Creates a new RoiNumber.
    #[inline]
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for RoiNumber {
    type Error = RtscanError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        u32::try_from(number)
            .map(RoiNumber)
            .map_err(|_| RtscanError::Validation {
                message: format!("ROI number must be a non-negative 32-bit integer, got {number}"),
            })
    }
}

impl fmt::Debug for RoiNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoiNumber({})", self.0)
    }
}

impl fmt::Display for RoiNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One StructureSetROISequence item as read from the file, before
/// validation.
#[derive(Clone, Debug, PartialEq)]
pub struct RoiDeclaration {
    pub name: String,
    pub number: i64,
    pub frame_of_reference_uid: String,
}

impl RoiDeclaration {
    /// Reads ROIName, ROINumber and ReferencedFrameOfReferenceUID.
    pub fn from_item(item: &Dataset) -> Result<Self, RtscanError> {
        Ok(Self {
            name: dicom::required_string(item, tags::ROI_NAME, "ROIName")?,
            number: dicom::required_int(item, tags::ROI_NUMBER, "ROINumber")?,
            frame_of_reference_uid: dicom::required_string(
                item,
                tags::REFERENCED_FRAME_OF_REFERENCE_UID,
                "ReferencedFrameOfReferenceUID",
            )?,
        })
    }
}

/// A named structure and its per-slice contours.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Roi {
    name: String,
    number: RoiNumber,
    frame_of_reference_uid: String,
    slices: Vec<ContourSlice>,
}

impl Roi {
    /// Creates an ROI, rejecting negative ROI numbers.
    pub fn new(
        name: impl Into<String>,
        number: i64,
        frame_of_reference_uid: impl Into<String>,
        slices: Vec<ContourSlice>,
    ) -> Result<Self, RtscanError> {
        Ok(Self {
            name: name.into(),
            number: RoiNumber::try_from(number)?,
            frame_of_reference_uid: frame_of_reference_uid.into(),
            slices,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> RoiNumber {
        self.number
    }

    pub fn frame_of_reference_uid(&self) -> &str {
        &self.frame_of_reference_uid
    }

    pub fn slices(&self) -> &[ContourSlice] {
        &self.slices
    }

    /// Total number of points across all slices.
    pub fn point_count(&self) -> usize {
        self.slices.iter().map(ContourSlice::len).sum()
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.slices.first().map(ContourSlice::len);
        let last = (self.slices.len() > 1)
            .then(|| self.slices.last().map(ContourSlice::len))
            .flatten();
        write!(
            f,
            "Roi(name={}, number={}, slices={}, first_slice_points={:?}, last_slice_points={:?})",
            self.name,
            self.number,
            self.slices.len(),
            first,
            last
        )
    }
}

/// The ROIs of one structure set, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RoiSet {
    rois: Vec<Roi>,
}

impl RoiSet {
    /// Builds the set from an RTSTRUCT dataset.
    ///
    /// Each declared ROI must have a matching ROIContourSequence item. ROIs
    /// whose contours come back empty are left out of the set.
    pub fn from_rtstruct(dataset: &Dataset, policy: &ContourPolicy) -> Result<Self, RtscanError> {
        let declared = dicom::items(dataset, tags::STRUCTURE_SET_ROI_SEQUENCE).ok_or(
            RtscanError::MissingAttribute {
                name: "StructureSetROISequence",
            },
        )?;

        let mut rois = Vec::with_capacity(declared.len());
        for item in declared {
            let declaration = RoiDeclaration::from_item(item)?;
            let record = find_contour_record(dataset, declaration.number)?;
            let extraction = extract_contours(record, &declaration.name, policy)?;
            if extraction.slices.is_empty() {
                tracing::warn!(
                    roi = %declaration.name,
                    outcome = ?extraction.outcome,
                    "ROI {} has no contour points; skipping this ROI",
                    declaration.name
                );
                continue;
            }

            rois.push(Roi::new(
                declaration.name,
                declaration.number,
                declaration.frame_of_reference_uid,
                extraction.slices,
            )?);
        }

        Ok(Self { rois })
    }

    pub fn rois(&self) -> &[Roi] {
        &self.rois
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Roi> {
        self.rois.iter()
    }

    pub fn len(&self) -> usize {
        self.rois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rois.is_empty()
    }

    /// Names of all ROIs, in order.
    pub fn roi_names(&self) -> Vec<&str> {
        self.rois.iter().map(Roi::name).collect()
    }

    /// The first ROI with the given name.
    pub fn get(&self, name: &str) -> Option<&Roi> {
        self.rois.iter().find(|roi| roi.name == name)
    }

    pub fn by_number(&self, number: RoiNumber) -> Option<&Roi> {
        self.rois.iter().find(|roi| roi.number == number)
    }
}

impl<'a> IntoIterator for &'a RoiSet {
    type Item = &'a Roi;
    type IntoIter = std::slice::Iter<'a, Roi>;

    fn into_iter(self) -> Self::IntoIter {
        self.rois.iter()
    }
}

/// Finds the ROIContourSequence item whose ReferencedROINumber matches.
pub fn find_contour_record(dataset: &Dataset, number: i64) -> Result<&Dataset, RtscanError> {
    for record in dicom::items(dataset, tags::ROI_CONTOUR_SEQUENCE).unwrap_or_default() {
        let referenced =
            dicom::int(record, tags::REFERENCED_ROI_NUMBER, "ReferencedROINumber")?;
        if referenced == Some(number) {
            return Ok(record);
        }
    }
    Err(RtscanError::RoiNotFound { number })
}
