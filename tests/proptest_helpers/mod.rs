#![allow(dead_code)]

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_object::InMemDicomObject;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use rtscan::dicom::tags;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Coordinates that survive a decimal-string round trip exactly.
pub fn arb_coordinate() -> impl Strategy<Value = f64> {
    (-5000i32..5000).prop_map(|v| f64::from(v) / 4.0)
}

/// A flat `x\y\z...` array of 1..=8 points.
pub fn arb_slice_data() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        (arb_coordinate(), arb_coordinate(), arb_coordinate()),
        1..=8,
    )
    .prop_map(|points| points.into_iter().flat_map(|(x, y, z)| [x, y, z]).collect())
}

/// Slices of a contour record; `None` marks a slice without ContourData.
pub fn arb_record_slices(max_slices: usize) -> impl Strategy<Value = Vec<Option<Vec<f64>>>> {
    prop::collection::vec(
        prop_oneof![4 => arb_slice_data().prop_map(Some), 1 => Just(None)],
        1..=max_slices,
    )
}

/// Slices where every item carries data.
pub fn arb_complete_slices(max_slices: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(arb_slice_data(), 1..=max_slices)
}

/// Builds one ROIContourSequence item from generated slices.
pub fn contour_record(slices: &[Option<Vec<f64>>]) -> InMemDicomObject {
    let items: Vec<InMemDicomObject> = slices
        .iter()
        .map(|data| {
            let mut item = InMemDicomObject::new_empty();
            if let Some(values) = data {
                let values = PrimitiveValue::Strs(values.iter().map(f64::to_string).collect());
                item.put(DataElement::new(tags::CONTOUR_DATA, VR::DS, values));
            }
            item
        })
        .collect();

    let mut record = InMemDicomObject::new_empty();
    record.put(DataElement::new(
        tags::REFERENCED_ROI_NUMBER,
        VR::IS,
        PrimitiveValue::from("1"),
    ));
    record.put(DataElement::new(
        tags::CONTOUR_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(items),
    ));
    record
}
