#![cfg(feature = "cli")]

use std::path::Path;

use approx::assert_abs_diff_eq;
use assert_cmd::Command;
use image::{GrayImage, Luma};
use iris_locator::io::{IrisDetectConfig, IrisReport};
use iris_locator::{Rect, SegmentParams};
use predicates::prelude::*;

/// Two synthetic eyes (dark pupil, gray iris) on a bright 200x100 canvas.
fn write_face(path: &Path) {
    let centers = [(50.0f32, 50.0f32), (150.0, 50.0)];
    let img = GrayImage::from_fn(200, 100, |x, y| {
        let d = centers
            .iter()
            .map(|&(cx, cy)| (x as f32 - cx).hypot(y as f32 - cy))
            .fold(f32::INFINITY, f32::min);
        Luma([if d <= 15.0 {
            20
        } else if d <= 30.0 {
            90
        } else {
            210
        }])
    });
    img.save(path).unwrap();
}

fn bin() -> Command {
    Command::cargo_bin("iris-locator").unwrap()
}

#[test]
fn detect_prints_a_report_per_region() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("face.png");
    write_face(&image);

    let out = bin()
        .args(["detect", "--image"])
        .arg(&image)
        .args(["--roi", "0,0,100,100", "--roi", "100,0,100,100", "--roi", "150,0,100,100"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: IrisReport = serde_json::from_slice(&out).unwrap();
    assert_eq!((report.width, report.height), (200, 100));
    assert_eq!(report.regions.len(), 3);
    assert_eq!(report.found(), 2);

    let right = report.regions[1].circle_image.unwrap();
    assert_abs_diff_eq!(right.center_x, 150.0, epsilon = 2.5);
    assert_abs_diff_eq!(right.center_y, 50.0, epsilon = 2.5);
    assert!(report.regions[2].error.is_some());
    assert!(report.events.is_empty());
}

#[test]
fn verbose_logging_keeps_stdout_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("face.png");
    write_face(&image);

    let assert = bin()
        .env_remove("RUST_LOG")
        .args(["--log-level", "debug", "detect", "--image"])
        .arg(&image)
        .args(["--roi", "0,0,100,100"])
        .assert()
        .success();
    let output = assert.get_output();

    let report: IrisReport = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report.found(), 1);
    assert!(!output.stderr.is_empty());
}

#[test]
fn detect_writes_events_and_debug_images() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("face.png");
    let output = dir.path().join("report.json");
    let debug = dir.path().join("debug");
    write_face(&image);

    bin()
        .args(["detect", "--events", "--image"])
        .arg(&image)
        .args(["--roi", "0,0,100,100", "--output"])
        .arg(&output)
        .arg("--debug-dir")
        .arg(&debug)
        .assert()
        .success();

    let report = IrisReport::load_json(&output).unwrap();
    assert_eq!(report.found(), 1);
    assert_eq!(report.events.len(), 6);
    for stage in ["smoothed", "histogram", "binary", "edges", "candidates"] {
        assert!(debug.join(format!("roi0_{stage}.png")).exists(), "{stage}");
    }
}

#[test]
fn run_uses_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("face.png");
    let output = dir.path().join("out.json");
    write_face(&image);

    let cfg = IrisDetectConfig {
        image_path: image.display().to_string(),
        rois: vec![Rect::new(100, 0, 100, 100)],
        output_path: Some(output.display().to_string()),
        debug_dir: None,
        params: SegmentParams::default(),
    };
    let cfg_path = dir.path().join("cfg.json");
    cfg.write_json(&cfg_path).unwrap();

    bin()
        .arg("run")
        .arg(&cfg_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("out.json"));

    let report = IrisReport::load_json(&output).unwrap();
    assert_eq!(report.regions.len(), 1);
    assert!(report.regions[0].circle.is_some());
}

#[test]
fn default_config_is_valid_json() {
    let out = bin()
        .arg("default-config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let params: SegmentParams = serde_json::from_slice(&out).unwrap();
    assert_eq!(params, SegmentParams::default());
}

#[test]
fn malformed_region_is_rejected() {
    bin()
        .args(["detect", "--image", "missing.png", "--roi", "1,2,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("x,y,width,height"));
}

#[test]
fn missing_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .args(["detect", "--image"])
        .arg(dir.path().join("nope.png"))
        .args(["--roi", "0,0,10,10"])
        .assert()
        .failure();
}
