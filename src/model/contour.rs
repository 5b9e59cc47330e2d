//! Contour extraction for a single ROI.
//!
//! An ROI contour record carries one ContourSequence item per image slice,
//! each with a flat `x\y\z\x\y\z...` ContourData array. Real-world files
//! regularly lose the data of the final slice, so extraction reports *why*
//! it returned what it did instead of failing.

use serde::Serialize;

use crate::dicom::{self, tags, Dataset};
use crate::error::RtscanError;

/// A point in patient coordinates (millimetres).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One polygon of an ROI on one image slice.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContourSlice {
    points: Vec<Point3>,
}

impl ContourSlice {
    /// Groups a flat coordinate array into (x, y, z) triples.
    ///
    /// Returns `None` when the length is not a multiple of 3.
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() % 3 != 0 {
            return None;
        }
        let points = values
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        Some(Self { points })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The z coordinate of the first point, if any.
    pub fn z(&self) -> Option<f64> {
        self.points.first().map(|p| p.z)
    }
}

/// Caller-controlled tolerance for incomplete contour data.
#[derive(Clone, Copy, Debug)]
pub struct ContourPolicy {
    /// Keep the preceding slices when only the final slice lacks data.
    pub allow_missing_trailing_slice: bool,
}

impl Default for ContourPolicy {
    fn default() -> Self {
        Self {
            allow_missing_trailing_slice: true,
        }
    }
}

/// Why an extraction returned the slices it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ContourOutcome {
    /// Every slice carried coordinate data.
    Complete,
    /// Only the last slice lacked data; it was dropped.
    TrailingSliceDropped,
    /// Only the last slice lacked data and the policy forbids dropping it.
    TrailingSliceRejected,
    /// A slice other than the last lacked data.
    InteriorSliceMissing { index: usize },
    /// The record has no slices at all.
    NoContourSequence,
}

impl ContourOutcome {
    /// Whether the slices parsed before the gap are handed to the caller.
    ///
    /// Interior gaps currently discard everything, unlike trailing gaps.
    pub fn keeps_parsed_slices(&self) -> bool {
        matches!(
            self,
            ContourOutcome::Complete | ContourOutcome::TrailingSliceDropped
        )
    }
}

/// The result of extracting one ROI's contours.
#[derive(Clone, Debug)]
pub struct ContourExtraction {
    pub slices: Vec<ContourSlice>,
    pub outcome: ContourOutcome,
    /// Number of ContourSequence items in the source record.
    pub declared_slices: usize,
}

impl ContourExtraction {
    fn empty(outcome: ContourOutcome, declared_slices: usize) -> Self {
        Self {
            slices: Vec::new(),
            outcome,
            declared_slices,
        }
    }
}

/// Extracts the per-slice point arrays of one ROIContourSequence item.
///
/// Missing coordinate data never fails the call; it is reported through
/// [`ContourOutcome`]. Coordinate arrays that cannot be grouped into
/// triples, or that are not numeric, are errors.
pub fn extract_contours(
    record: &Dataset,
    roi_name: &str,
    policy: &ContourPolicy,
) -> Result<ContourExtraction, RtscanError> {
    let items = dicom::items(record, tags::CONTOUR_SEQUENCE).unwrap_or_default();
    if items.is_empty() {
        tracing::warn!(
            roi = roi_name,
            "ROI {roi_name} does not have a ContourSequence; returning no slices"
        );
        return Ok(ContourExtraction::empty(ContourOutcome::NoContourSequence, 0));
    }

    tracing::debug!(
        roi = roi_name,
        "For ROI {roi_name}, the ContourSequence has {} slices",
        items.len()
    );

    let mut slices = Vec::with_capacity(items.len());
    let mut first_missing = None;
    for (index, item) in items.iter().enumerate() {
        let Some(values) = dicom::floats(item, tags::CONTOUR_DATA, "ContourData")? else {
            first_missing = Some(index);
            break;
        };
        let slice =
            ContourSlice::from_flat(&values).ok_or_else(|| RtscanError::MalformedContourData {
                roi: roi_name.to_string(),
                slice: index,
                len: values.len(),
            })?;
        slices.push(slice);
    }

    let last = items.len() - 1;
    let outcome = match first_missing {
        None => ContourOutcome::Complete,
        Some(index) if index == last && policy.allow_missing_trailing_slice => {
            ContourOutcome::TrailingSliceDropped
        }
        Some(index) if index == last => ContourOutcome::TrailingSliceRejected,
        Some(index) => ContourOutcome::InteriorSliceMissing { index },
    };

    match outcome {
        ContourOutcome::TrailingSliceDropped if !slices.is_empty() => tracing::warn!(
            roi = roi_name,
            "For ROI {roi_name}, the last slice is missing in the RTSTRUCT file; \
             ContourSequence has {} slices, only the first {} will be used",
            items.len(),
            slices.len()
        ),
        ContourOutcome::TrailingSliceRejected => tracing::warn!(
            roi = roi_name,
            "For ROI {roi_name}, the last slice is missing and dropping it is not allowed; \
             returning no slices"
        ),
        ContourOutcome::InteriorSliceMissing { index } => tracing::warn!(
            roi = roi_name,
            "For ROI {roi_name}, slice {index} of {} is missing ContourData; returning no slices",
            items.len()
        ),
        _ => {}
    }

    if !outcome.keeps_parsed_slices() {
        slices.clear();
    }

    Ok(ContourExtraction {
        slices,
        outcome,
        declared_slices: items.len(),
    })
}
