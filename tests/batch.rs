mod common;

use dicom_dictionary_std::uids;
use rtscan::batch::{load_structure_sets, BatchOptions, BatchPolicy, BatchReport};
use rtscan::dicom::{tags, Modality};
use rtscan::scan::{scan_roots, ScanOptions, SilentObserver};
use rtscan::RtscanError;
use tempfile::tempdir;

fn broken_rtstruct(path: &std::path::Path) {
    // Declares ROI 2 but only carries contours for ROI 1.
    let mut obj = common::rtstruct_dataset(&[(1, "Heart", 1), (2, "Lung", 1)]);
    common::put_seq(
        &mut obj,
        tags::ROI_CONTOUR_SEQUENCE,
        vec![common::roi_contour(
            1,
            vec![common::contour_item(Some(common::TRIANGLE))],
        )],
    );
    common::write_dicom(path, obj, uids::RT_STRUCTURE_SET_STORAGE);
}

#[test]
fn loads_structure_sets_and_skips_other_modalities() {
    let dir = tempdir().unwrap();
    let rs = dir.path().join("rs.dcm");
    let ct = dir.path().join("ct.dcm");
    common::write_rtstruct(&rs, &[(1, "Heart", 2), (2, "Lung", 2)]);
    common::write_ct(&ct);

    let outcome = load_structure_sets(&[&rs, &ct], &BatchOptions::default(), None).unwrap();

    assert_eq!(outcome.structure_sets().count(), 1);
    assert_eq!(outcome.loaded[0].path, rs);
    assert_eq!(outcome.loaded[0].structure_set.roi_names(), vec!["Heart", "Lung"]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].modality, Modality::Ct);
    assert!(outcome.is_clean());
}

#[test]
fn abort_policy_stops_at_first_failure() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.dcm");
    let good = dir.path().join("good.dcm");
    broken_rtstruct(&bad);
    common::write_rtstruct(&good, &[(1, "Heart", 1)]);

    let err = load_structure_sets(&[&bad, &good], &BatchOptions::default(), None).unwrap_err();
    let RtscanError::Batch { path, source } = err else {
        panic!("expected a batch error");
    };
    assert_eq!(path, bad);
    assert!(matches!(*source, RtscanError::RoiNotFound { number: 2 }));
}

#[test]
fn continue_policy_collects_failures() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.dcm");
    let junk = dir.path().join("junk.dcm");
    let good = dir.path().join("good.dcm");
    broken_rtstruct(&bad);
    common::write_text(&junk);
    common::write_rtstruct(&good, &[(1, "Heart", 1)]);

    let options = BatchOptions {
        policy: BatchPolicy::Continue,
        ..Default::default()
    };
    let outcome = load_structure_sets(&[&bad, &junk, &good], &options, None).unwrap();

    assert_eq!(outcome.loaded.len(), 1);
    assert_eq!(outcome.failures.len(), 2);
    assert!(matches!(
        outcome.failures[1].error,
        RtscanError::InvalidFormat { .. }
    ));
}

#[test]
fn scan_then_load_report() {
    let dir = tempdir().unwrap();
    common::write_rtstruct(&dir.path().join("a/rs.dcm"), &[(1, "Heart", 1), (2, "Lung", 1)]);
    common::write_rtstruct(&dir.path().join("b/rs.dcm"), &[(3, "Brain", 2)]);
    common::write_ct(&dir.path().join("a/ct.dcm"));

    let scanned = scan_roots(&[dir.path()], &ScanOptions::default(), &mut SilentObserver).unwrap();
    let loaded = load_structure_sets(&scanned.paths, &BatchOptions::default(), None).unwrap();
    let report = BatchReport::new(&scanned, &loaded);

    assert_eq!(report.found, 2);
    let text = report.to_string();
    assert!(text.contains("Loaded 2 structure set(s), skipped 0, failed 0"));
    assert!(text.contains("(2 ROI(s)): Heart, Lung"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["loaded"][1]["roi_names"][0], "Brain");
    assert_eq!(
        json["loaded"][0]["referenced_series_uid"],
        common::REFERENCED_SERIES
    );
}
