//! Tag paths of the RTSTRUCT schema and the cross-modality metadata set.
//!
//! Producers of structure sets rely on these exact tag numbers, so they are
//! spelled out here rather than looked up by keyword at runtime.

use dicom_core::Tag;

pub use dicom_dictionary_std::tags::{
    MODALITIES_IN_STUDY, MODALITY, PIXEL_DATA, SERIES_INSTANCE_UID,
};

// Structure Set ROI module
/// StructureSetROISequence (3006,0020)
pub const STRUCTURE_SET_ROI_SEQUENCE: Tag = Tag(0x3006, 0x0020);
/// ROINumber (3006,0022)
pub const ROI_NUMBER: Tag = Tag(0x3006, 0x0022);
/// ReferencedFrameOfReferenceUID (3006,0024)
pub const REFERENCED_FRAME_OF_REFERENCE_UID: Tag = Tag(0x3006, 0x0024);
/// ROIName (3006,0026)
pub const ROI_NAME: Tag = Tag(0x3006, 0x0026);

// ROI Contour module
/// ROIContourSequence (3006,0039)
pub const ROI_CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0039);
/// ContourSequence (3006,0040)
pub const CONTOUR_SEQUENCE: Tag = Tag(0x3006, 0x0040);
/// ContourData (3006,0050)
pub const CONTOUR_DATA: Tag = Tag(0x3006, 0x0050);
/// ReferencedROINumber (3006,0084)
pub const REFERENCED_ROI_NUMBER: Tag = Tag(0x3006, 0x0084);

// Referenced series chain
/// ReferencedFrameOfReferenceSequence (3006,0010)
pub const REFERENCED_FRAME_OF_REFERENCE_SEQUENCE: Tag = Tag(0x3006, 0x0010);
/// RTReferencedStudySequence (3006,0012)
pub const RT_REFERENCED_STUDY_SEQUENCE: Tag = Tag(0x3006, 0x0012);
/// RTReferencedSeriesSequence (3006,0014)
pub const RT_REFERENCED_SERIES_SEQUENCE: Tag = Tag(0x3006, 0x0014);

/// Sequence path from the dataset root down to the referenced
/// SeriesInstanceUID.
pub const REFERENCED_SERIES_PATH: [Tag; 4] = [
    REFERENCED_FRAME_OF_REFERENCE_SEQUENCE,
    RT_REFERENCED_STUDY_SEQUENCE,
    RT_REFERENCED_SERIES_SEQUENCE,
    SERIES_INSTANCE_UID,
];

// Cross-modality record metadata
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
pub const SCAN_OPTIONS: Tag = Tag(0x0018, 0x0022);
pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
pub const DATA_COLLECTION_DIAMETER: Tag = Tag(0x0018, 0x0090);
pub const PATIENT_POSITION: Tag = Tag(0x0018, 0x5100);
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
pub const MANUFACTURER_MODEL_NAME: Tag = Tag(0x0008, 0x1090);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
pub const RESCALE_TYPE: Tag = Tag(0x0028, 0x1054);
pub const NUMBER_OF_SLICES: Tag = Tag(0x0054, 0x0081);
