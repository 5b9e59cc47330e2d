#![allow(dead_code)]

use std::fs;
use std::path::Path;

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

use rtscan::dicom::tags as rt;

pub const TRIANGLE: &[f64] = &[0.0, 0.0, 1.5, 10.0, 0.0, 1.5, 0.0, 10.0, 1.5];
pub const REFERENCED_SERIES: &str = "1.2.826.0.1.3680043.2.1125.1";

pub fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    obj.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

pub fn put_seq(obj: &mut InMemDicomObject, tag: Tag, items: Vec<InMemDicomObject>) {
    obj.put(DataElement::new(tag, VR::SQ, DataSetSequence::from(items)));
}

pub fn contour_item(points: Option<&[f64]>) -> InMemDicomObject {
    let mut item = InMemDicomObject::new_empty();
    put_str(&mut item, Tag(0x3006, 0x0042), VR::CS, "CLOSED_PLANAR");
    if let Some(points) = points {
        let values = PrimitiveValue::Strs(points.iter().map(f64::to_string).collect());
        item.put(DataElement::new(rt::CONTOUR_DATA, VR::DS, values));
    }
    item
}

/// A slice whose ContourData element is present but zero-length.
pub fn empty_contour_item() -> InMemDicomObject {
    let mut item = InMemDicomObject::new_empty();
    put_str(&mut item, Tag(0x3006, 0x0042), VR::CS, "CLOSED_PLANAR");
    item.put(DataElement::new(rt::CONTOUR_DATA, VR::DS, PrimitiveValue::Empty));
    item
}

pub fn roi_contour(number: i64, slices: Vec<InMemDicomObject>) -> InMemDicomObject {
    let mut item = InMemDicomObject::new_empty();
    put_str(&mut item, rt::REFERENCED_ROI_NUMBER, VR::IS, &number.to_string());
    if !slices.is_empty() {
        put_seq(&mut item, rt::CONTOUR_SEQUENCE, slices);
    }
    item
}

/// An RTSTRUCT dataset with one ROI per `(number, name, slices)`, each
/// slice holding [`TRIANGLE`].
pub fn rtstruct_dataset(rois: &[(i64, &str, usize)]) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put_str(&mut obj, tags::SOP_CLASS_UID, VR::UI, uids::RT_STRUCTURE_SET_STORAGE);
    put_str(&mut obj, tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4.100");
    put_str(&mut obj, tags::MODALITY, VR::CS, "RTSTRUCT");
    put_str(&mut obj, rt::MANUFACTURER, VR::LO, "ACME Oncology");

    let mut series = InMemDicomObject::new_empty();
    put_str(&mut series, tags::SERIES_INSTANCE_UID, VR::UI, REFERENCED_SERIES);
    let mut study = InMemDicomObject::new_empty();
    put_seq(&mut study, rt::RT_REFERENCED_SERIES_SEQUENCE, vec![series]);
    let mut frame = InMemDicomObject::new_empty();
    put_seq(&mut frame, rt::RT_REFERENCED_STUDY_SEQUENCE, vec![study]);
    put_seq(&mut obj, rt::REFERENCED_FRAME_OF_REFERENCE_SEQUENCE, vec![frame]);

    let declared = rois
        .iter()
        .map(|(number, name, _)| {
            let mut item = InMemDicomObject::new_empty();
            put_str(&mut item, rt::ROI_NUMBER, VR::IS, &number.to_string());
            put_str(&mut item, rt::ROI_NAME, VR::LO, name);
            put_str(&mut item, rt::REFERENCED_FRAME_OF_REFERENCE_UID, VR::UI, "1.2.3.4");
            item
        })
        .collect();
    put_seq(&mut obj, rt::STRUCTURE_SET_ROI_SEQUENCE, declared);

    let contours = rois
        .iter()
        .map(|(number, _, slices)| {
            roi_contour(*number, (0..*slices).map(|_| contour_item(Some(TRIANGLE))).collect())
        })
        .collect();
    put_seq(&mut obj, rt::ROI_CONTOUR_SEQUENCE, contours);
    obj
}

pub fn ct_dataset() -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put_str(&mut obj, tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE);
    put_str(&mut obj, tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4.200");
    put_str(&mut obj, tags::MODALITY, VR::CS, "CT");
    put_str(&mut obj, rt::SLICE_THICKNESS, VR::DS, "2.5");
    obj
}

pub fn write_dicom(path: &Path, obj: InMemDicomObject, sop_class_uid: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(sop_class_uid)
                .media_storage_sop_instance_uid("1.2.3.4.999"),
        )
        .expect("build file meta");
    file.write_to_file(path).expect("write dicom file");
}

pub fn write_rtstruct(path: &Path, rois: &[(i64, &str, usize)]) {
    write_dicom(path, rtstruct_dataset(rois), uids::RT_STRUCTURE_SET_STORAGE);
}

pub fn write_ct(path: &Path) {
    write_dicom(path, ct_dataset(), uids::CT_IMAGE_STORAGE);
}

pub fn write_text(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, "this is not a DICOM file\n").expect("write text file");
}
