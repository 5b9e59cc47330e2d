//! In-memory model of RTSTRUCT records.
//!
//! A [`StructureSet`] owns its metadata and a [`RoiSet`]; each [`Roi`] holds
//! ordered [`ContourSlice`]s of patient-space points. Everything here is
//! immutable once built.

pub mod contour;
pub mod metadata;
pub mod roi;
pub mod structure_set;

pub use contour::{
    extract_contours, ContourExtraction, ContourOutcome, ContourPolicy, ContourSlice, Point3,
};
pub use metadata::{RecordMetadata, StructureSetMetadata};
pub use roi::{find_contour_record, Roi, RoiDeclaration, RoiNumber, RoiSet};
pub use structure_set::StructureSet;
