//! Image crops captured during annotation end up in the full export.

mod common;

use annotrack::commands::record::submit_to;
use annotrack::fs::{ImageReferences, ImageSource, ImageStore};
use annotrack::models::{BoundingBox, Category, ImagePart, InconsistencyPart, TaskRecord};
use common::Project;
use std::fs;
use std::io::Read;

fn png() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"not really pixels");
    bytes
}

fn bbox() -> BoundingBox {
    BoundingBox {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 50.0,
    }
}

fn image_record(image_id: &str) -> TaskRecord {
    TaskRecord::new(
        vec![InconsistencyPart::Image(ImagePart {
            page: 2,
            image_id: image_id.to_string(),
            bbox: bbox(),
            image_data: Some("data:image/png;base64,AAAA".to_string()),
        })],
        "",
        Category::FigureTable,
        "figure count differs from table",
    )
}

#[test]
fn test_stored_crop_is_packaged_with_its_metadata() {
    let project = Project::new(10);
    let images = ImageStore::for_work_dir(&project.work_dir());
    let image_id = images
        .store_image(
            &png(),
            ImageSource {
                document_id: "P1".to_string(),
                page: 2,
                bbox: bbox(),
            },
        )
        .unwrap();
    assert!(image_id.starts_with("P1_2_"));

    let (mut session, _) = project.open();
    session.submit(image_record(&image_id)).unwrap();
    let outcome = session.export_now(false);
    let path = outcome.path().unwrap().clone();

    let mut archive = zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();

    let mut crop = Vec::new();
    archive
        .by_name(&format!("images/{image_id}.png"))
        .unwrap()
        .read_to_end(&mut crop)
        .unwrap();
    assert_eq!(crop, png());
    assert!(archive
        .by_name(&format!("metadata/{image_id}.json"))
        .is_ok());

    let mut annotations = String::new();
    archive
        .by_name("annotations.json")
        .unwrap()
        .read_to_string(&mut annotations)
        .unwrap();
    assert!(!annotations.contains("base64"));
    assert!(annotations.contains(&image_id));

    let mut summary = String::new();
    archive
        .by_name("export_summary.json")
        .unwrap()
        .read_to_string(&mut summary)
        .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["total_images"], 1);
    assert_eq!(summary["missing_image_ids"].as_array().unwrap().len(), 0);
}

#[test]
fn test_missing_crop_is_reported_not_fatal() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    session.submit(image_record("P1_2_deadbeef")).unwrap();

    let outcome = session.export_now(false);
    assert!(!outcome.is_degraded());

    let path = outcome.path().unwrap().clone();
    let mut archive = zip::ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
    let mut summary = String::new();
    archive
        .by_name("export_summary.json")
        .unwrap()
        .read_to_string(&mut summary)
        .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["total_images"], 0);
    assert_eq!(summary["missing_image_ids"][0], "P1_2_deadbeef");
}

#[test]
fn test_inline_payload_never_reaches_the_checkpoint() {
    let project = Project::new(10);
    let (mut session, _) = project.open();
    session.submit(image_record("P1_2_deadbeef")).unwrap();

    let raw = fs::read_to_string(project.work_dir().checkpoint_path()).unwrap();
    assert!(!raw.contains("image_data"));
    assert!(raw.contains("P1_2_deadbeef"));
}

#[test]
fn test_dotted_document_ids_can_reference_images() {
    let project = Project::with_dataset(
        r#"{"2301.00001v2": {"has_inconsistency": true, "inconsistencies": ["fig 3 vs text"]}}"#,
        10,
    );
    let images = ImageStore::for_work_dir(&project.work_dir());
    let image_id = images
        .store_image(
            &png(),
            ImageSource {
                document_id: "2301.00001v2".to_string(),
                page: 2,
                bbox: bbox(),
            },
        )
        .unwrap();

    let (mut session, _) = project.open();
    let submission =
        submit_to(&mut session, image_record(&image_id), Some("2301.00001v2")).unwrap();
    assert!(submission.cursor.is_terminal());
    assert!(images.contains(&image_id));
}
