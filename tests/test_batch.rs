//! Integration tests for batch processing and artifact persistence.
//!
//! Tests cover:
//! - Per-file failure isolation with a corrupt input
//! - Silent skipping of files outside the allow-list
//! - All-or-nothing writes of the crop/mask pair
//! - Directory-level errors

mod common;

use common::*;
use image::{GrayImage, RgbImage};
use std::ffi::OsStr;

#[test]
fn test_corrupt_file_does_not_stop_the_batch() -> anyhow::Result<()> {
    // 1. Three valid images, one corrupt file, one file outside the allow-list
    let src = tempfile::TempDir::new()?;
    let dst = tempfile::TempDir::new()?;
    write_fundus(src.path(), "a.png", 64, 48, 22.0);
    write_fundus(src.path(), "b.bmp", 48, 64, 22.0);
    write_fundus(src.path(), "c.png", 60, 60, 26.0);
    std::fs::write(src.path().join("broken.png"), b"\x89PNG not really")?;
    std::fs::write(src.path().join("notes.txt"), b"ignore me")?;

    // 2. Run the batch
    let cropper = RetinaCropper::new(CropConfig::default(), 32)?;
    let runner = BatchRunner::with_destination(cropper, dst.path())?;
    let report = runner.run(src.path(), &brightness_model(64))?;

    // 3. Three pairs written, one failure reported, one skip
    assert_eq!(report.processed.len(), 3);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed_files()[0].ends_with("broken.png"));
    assert_eq!(report.skipped.len(), 1);
    assert!(!report.is_clean());

    let expected = vec!["a.png", "b.bmp", "c.png"];
    assert_eq!(list_names(&dst.path().join("Images")), expected);
    assert_eq!(list_names(&dst.path().join("Masks")), expected);
    Ok(())
}

#[test]
fn test_summary_lists_failures() -> anyhow::Result<()> {
    let src = tempfile::TempDir::new()?;
    let dst = tempfile::TempDir::new()?;
    write_fundus(src.path(), "dark.png", 40, 40, 15.0);

    let cropper = RetinaCropper::new(CropConfig::default(), 32)?;
    let runner = BatchRunner::with_destination(cropper, dst.path())?;
    let report = runner.run(src.path(), &blank_model())?;

    let summary = report.summary();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].file, "dark.png");
    assert!(summary.failed[0].error.contains("no foreground"));

    let json = serde_json::to_value(&summary)?;
    assert_eq!(json["failed"][0]["file"], "dark.png");
    Ok(())
}

#[test]
fn test_extension_match_is_case_sensitive() -> anyhow::Result<()> {
    let src = tempfile::TempDir::new()?;
    let dst = tempfile::TempDir::new()?;
    write_fundus(src.path(), "upper.PNG", 40, 40, 18.0);
    write_fundus(src.path(), "mixed.Png", 40, 40, 18.0);

    let cropper = RetinaCropper::new(CropConfig::default(), 32)?;
    let runner = BatchRunner::with_destination(cropper, dst.path())?;
    let (accepted, skipped) = runner.collect_files(src.path())?;

    assert_eq!(accepted, vec![src.path().join("upper.PNG")]);
    assert_eq!(skipped, vec![src.path().join("mixed.Png")]);
    Ok(())
}

#[test]
fn test_missing_source_directory_is_fatal() -> anyhow::Result<()> {
    let dst = tempfile::TempDir::new()?;
    let cropper = RetinaCropper::new(CropConfig::default(), 32)?;
    let runner = BatchRunner::with_destination(cropper, dst.path())?;

    let result = runner.run(&dst.path().join("nowhere"), &brightness_model(64));
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_custom_output_directory_names() -> anyhow::Result<()> {
    let src = tempfile::TempDir::new()?;
    let dst = tempfile::TempDir::new()?;
    write_fundus(src.path(), "eye.png", 64, 48, 22.0);

    let config = CropConfig {
        images_dir: "crops".to_string(),
        masks_dir: "masks".to_string(),
        ..Default::default()
    };
    let runner = BatchRunner::with_destination(RetinaCropper::new(config, 32)?, dst.path())?;
    let report = runner.run(src.path(), &brightness_model(64))?;

    assert!(report.is_clean());
    assert_eq!(list_names(&dst.path().join("crops")), vec!["eye.png"]);
    assert_eq!(list_names(&dst.path().join("masks")), vec!["eye.png"]);
    Ok(())
}

#[test]
fn test_failed_mask_write_rolls_back_image() -> anyhow::Result<()> {
    let dst = tempfile::TempDir::new()?;
    let writer = ArtifactWriter::create(dst.path(), &CropConfig::default())?;

    // A directory squatting on the mask's target name makes the final rename fail
    std::fs::create_dir(writer.masks_dir().join("eye.png"))?;

    let crop = RgbImage::new(4, 4);
    let mask = GrayImage::new(4, 4);
    let result = writer.write_pair(OsStr::new("eye.png"), &crop, &mask);

    assert!(result.is_err());
    assert!(list_names(writer.images_dir()).is_empty());
    assert_eq!(list_names(writer.masks_dir()), vec!["eye.png"]);
    Ok(())
}

#[test]
fn test_unknown_output_format_writes_nothing() -> anyhow::Result<()> {
    let dst = tempfile::TempDir::new()?;
    let writer = ArtifactWriter::create(dst.path(), &CropConfig::default())?;

    let result = writer.write_pair(
        OsStr::new("eye.nope"),
        &RgbImage::new(2, 2),
        &GrayImage::new(2, 2),
    );

    assert!(matches!(result, Err(CropError::Image(_))));
    assert!(list_names(writer.images_dir()).is_empty());
    assert!(list_names(writer.masks_dir()).is_empty());
    Ok(())
}
