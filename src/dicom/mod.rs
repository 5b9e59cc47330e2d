//! Thin access layer over `dicom-object`.
//!
//! Everything that touches the tag-level parser lives here: partial reads
//! that stop before bulk data, full reads with error translation, and typed
//! accessors that turn "tag absent" into `None` instead of an error.

pub mod tags;

use std::fmt;
use std::path::Path;

use dicom_core::value::Value;
use dicom_core::{PrimitiveValue, Tag};
use dicom_object::{InMemDicomObject, OpenFileOptions};
use serde::{Serialize, Serializer};

use crate::error::RtscanError;

/// A parsed DICOM dataset (tag → value mapping).
pub type Dataset = InMemDicomObject;

/// The clinical type of a DICOM record, from the Modality (0008,0060) tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    RtStruct,
    Ct,
    RtDose,
    Seg,
    RtPlan,
    Other(String),
}

impl Modality {
    /// The DICOM code string for this modality.
    pub fn as_str(&self) -> &str {
        match self {
            Modality::RtStruct => "RTSTRUCT",
            Modality::Ct => "CT",
            Modality::RtDose => "RTDOSE",
            Modality::Seg => "SEG",
            Modality::RtPlan => "RTPLAN",
            Modality::Other(code) => code,
        }
    }
}

impl From<&str> for Modality {
    fn from(code: &str) -> Self {
        match code.trim() {
            "RTSTRUCT" => Modality::RtStruct,
            "CT" => Modality::Ct,
            "RTDOSE" => Modality::RtDose,
            "SEG" => Modality::Seg,
            "RTPLAN" => Modality::RtPlan,
            other => Modality::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Modality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Read and fully parse a DICOM file.
pub fn open_dataset(path: &Path) -> Result<Dataset, RtscanError> {
    let obj = OpenFileOptions::new()
        .open_file(path)
        .map_err(|source| RtscanError::invalid_format(path, source))?;
    Ok(obj.into_inner())
}

/// Read only the leading attributes of a file, up to (not including)
/// Modalities In Study, and return its modality.
///
/// This is the cheap check used to filter candidates during discovery.
pub fn read_modality(path: &Path) -> Result<Modality, RtscanError> {
    let obj = OpenFileOptions::new()
        .read_until(tags::MODALITIES_IN_STUDY)
        .open_file(path)
        .map_err(|source| RtscanError::invalid_format(path, source))?;

    dataset_modality(&obj).ok_or(RtscanError::MissingAttribute { name: "Modality" })
}

/// Returns true if the file at `path` declares the RTSTRUCT modality.
pub fn is_rtstruct(path: &Path) -> Result<bool, RtscanError> {
    Ok(read_modality(path)? == Modality::RtStruct)
}

/// The modality declared by an already-parsed dataset, if any.
pub fn dataset_modality(obj: &Dataset) -> Option<Modality> {
    string(obj, tags::MODALITY).map(|code| Modality::from(code.as_str()))
}

/// The first referenced series UID, following item 0 at every level of the
/// referenced frame of reference chain. Any missing link yields `None`.
pub fn referenced_series_uid(obj: &Dataset) -> Option<String> {
    let [frames, studies, series, uid] = tags::REFERENCED_SERIES_PATH;
    let frame = items(obj, frames)?.first()?;
    let study = items(frame, studies)?.first()?;
    let series = items(study, series)?.first()?;
    string(series, uid)
}

/// Every referenced series UID reachable through the referenced frame of
/// reference chain, visiting all items at each level in document order.
pub fn referenced_series_uids(obj: &Dataset) -> Vec<String> {
    let mut uids = Vec::new();
    collect_along_path(obj, &tags::REFERENCED_SERIES_PATH, &mut uids);
    uids
}

/// Read a file up to Pixel Data and collect its referenced series UIDs.
pub fn read_referenced_series_uids(path: &Path) -> Result<Vec<String>, RtscanError> {
    let obj = OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
        .map_err(|source| RtscanError::invalid_format(path, source))?;
    Ok(referenced_series_uids(&obj))
}

fn collect_along_path(obj: &Dataset, path: &[Tag], out: &mut Vec<String>) {
    match path {
        [] => {}
        [last] => {
            if let Some(values) = strings(obj, *last) {
                out.extend(values);
            }
        }
        [head, rest @ ..] => {
            for item in items(obj, *head).unwrap_or_default() {
                collect_along_path(item, rest, out);
            }
        }
    }
}

/// Items of a sequence attribute. `None` when the tag is absent or is not a
/// sequence.
pub fn items(obj: &Dataset, tag: Tag) -> Option<&[Dataset]> {
    obj.element(tag).ok().and_then(|elem| elem.items())
}

/// A trimmed string value. Absent and blank values are both `None`.
pub fn string(obj: &Dataset, tag: Tag) -> Option<String> {
    obj.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().trim_end_matches('\0').to_string())
        .filter(|s| !s.is_empty())
}

/// All values of a multi-valued string attribute.
fn strings(obj: &Dataset, tag: Tag) -> Option<Vec<String>> {
    let elem = obj.element(tag).ok()?;
    let joined = elem.to_str().ok()?;
    let values: Vec<String> = joined
        .split('\\')
        .map(|s| s.trim().trim_end_matches('\0').to_string())
        .filter(|s| !s.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// A required string attribute.
pub fn required_string(obj: &Dataset, tag: Tag, name: &'static str) -> Result<String, RtscanError> {
    string(obj, tag).ok_or(RtscanError::MissingAttribute { name })
}

/// An integer attribute. Absent → `Ok(None)`; present but unparsable → error.
pub fn int(obj: &Dataset, tag: Tag, name: &'static str) -> Result<Option<i64>, RtscanError> {
    let Ok(elem) = obj.element(tag) else {
        return Ok(None);
    };
    elem.to_int::<i64>()
        .map(Some)
        .map_err(|err| RtscanError::InvalidValue {
            name,
            message: err.to_string(),
        })
}

/// A required integer attribute.
pub fn required_int(obj: &Dataset, tag: Tag, name: &'static str) -> Result<i64, RtscanError> {
    int(obj, tag, name)?.ok_or(RtscanError::MissingAttribute { name })
}

/// A single floating point value, lenient: unparsable values are `None`.
pub fn float(obj: &Dataset, tag: Tag) -> Option<f64> {
    obj.element(tag).ok().and_then(|elem| elem.to_float64().ok())
}

/// A flat numeric array. Absent or zero-length → `Ok(None)`.
pub fn floats(obj: &Dataset, tag: Tag, name: &'static str) -> Result<Option<Vec<f64>>, RtscanError> {
    let Ok(elem) = obj.element(tag) else {
        return Ok(None);
    };
    // A zero-length element parses as `Empty`, which refuses numeric conversion.
    if let Value::Primitive(PrimitiveValue::Empty) = elem.value() {
        return Ok(None);
    }
    let values = elem
        .to_multi_float64()
        .map_err(|err| RtscanError::InvalidValue {
            name,
            message: err.to_string(),
        })?;
    Ok((!values.is_empty()).then_some(values))
}
