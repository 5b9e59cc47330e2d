//! Record-level metadata shared across modalities.

use std::fmt;

use serde::Serialize;

use crate::dicom::{self, tags, Dataset};

/// Optional attributes every record may carry, whatever its modality.
///
/// Absent tags stay `None`; serialized output always lists every field.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordMetadata {
    pub body_part_examined: Option<String>,
    pub data_collection_diameter: Option<f64>,
    pub number_of_slices: Option<i64>,
    pub slice_thickness: Option<f64>,
    pub patient_position: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_model_name: Option<String>,
    pub scan_options: Option<String>,
    pub rescale_type: Option<String>,
    pub rescale_slope: Option<f64>,
}

impl RecordMetadata {
    /// Reads each known attribute independently. Unparsable numeric values
    /// are treated as absent.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            body_part_examined: dicom::string(dataset, tags::BODY_PART_EXAMINED),
            data_collection_diameter: dicom::float(dataset, tags::DATA_COLLECTION_DIAMETER),
            number_of_slices: dicom::int(dataset, tags::NUMBER_OF_SLICES, "NumberOfSlices")
                .ok()
                .flatten(),
            slice_thickness: dicom::float(dataset, tags::SLICE_THICKNESS),
            patient_position: dicom::string(dataset, tags::PATIENT_POSITION),
            manufacturer: dicom::string(dataset, tags::MANUFACTURER),
            manufacturer_model_name: dicom::string(dataset, tags::MANUFACTURER_MODEL_NAME),
            scan_options: dicom::string(dataset, tags::SCAN_OPTIONS),
            rescale_type: dicom::string(dataset, tags::RESCALE_TYPE),
            rescale_slope: dicom::float(dataset, tags::RESCALE_SLOPE),
        }
    }

    /// `(keyword, value)` pairs for the fields that are set.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                out.push((key, value));
            }
        };
        push("BodyPartExamined", self.body_part_examined.clone());
        push(
            "DataCollectionDiameter",
            self.data_collection_diameter.map(|v| v.to_string()),
        );
        push("NumberOfSlices", self.number_of_slices.map(|v| v.to_string()));
        push("SliceThickness", self.slice_thickness.map(|v| v.to_string()));
        push("PatientPosition", self.patient_position.clone());
        push("Manufacturer", self.manufacturer.clone());
        push("ManufacturerModelName", self.manufacturer_model_name.clone());
        push("ScanOptions", self.scan_options.clone());
        push("RescaleType", self.rescale_type.clone());
        push("RescaleSlope", self.rescale_slope.map(|v| v.to_string()));
        out
    }
}

/// Metadata of a structure set: the shared record fields plus the ROI
/// count and the referenced image series.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StructureSetMetadata {
    #[serde(flatten)]
    pub record: RecordMetadata,
    #[serde(rename = "numROIs")]
    pub roi_count: usize,
    #[serde(rename = "ReferencedSeriesUID")]
    pub referenced_series_uid: Option<String>,
}

impl StructureSetMetadata {
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = self.record.entries();
        out.push(("numROIs", self.roi_count.to_string()));
        if let Some(uid) = &self.referenced_series_uid {
            out.push(("ReferencedSeriesUID", uid.clone()));
        }
        out
    }
}

impl fmt::Display for StructureSetMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.entries() {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}
