use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BACK_SIDE_OCR: &str = r#"{
    "Address": ["ZAGREB, ZAGREB", "ILICA 12"],
    "IssuedBy": ["PU ZAGREBAČKA"],
    "DateOfIssue": ["18.04.2017."]
}"#;

const OLD_ID_MRZ: &str = r#"{"issuer": "HRV", "opt1": "<<<<<<<<<<<<<<<"}"#;

fn templex(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("templex").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir.join("xdg"))
        .env("HOME", workdir);
    cmd
}

fn init_template(dir: &TempDir) {
    templex(dir.path())
        .args(["template", "init", "-o", "template.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created template"));
}

#[test]
fn test_template_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);

    templex(dir.path())
        .args(["template", "init", "-o", "template.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    templex(dir.path())
        .args(["template", "init", "-o", "template.json", "--force"])
        .assert()
        .success();
}

#[test]
fn test_template_check_bundled() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);

    templex(dir.path())
        .args(["template", "check", "template.json", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (2 classes, 3 groups)"));
}

#[test]
fn test_template_check_reports_warnings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.json"),
        r#"{
            "classes": {"default": [
                {"name": "Total", "position": {"x": 0.1, "y": 0.1, "width": 0.5, "height": 0.2}, "dewarp_height": 100}
            ]},
            "groups": {"Total": [{"name": "Amount", "type": "regex", "pattern": "([0-9]+"}]}
        }"#,
    )
    .unwrap();

    templex(dir.path())
        .args(["template", "check", "broken.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings:"))
        .stdout(predicate::str::contains("Amount"));

    templex(dir.path())
        .args(["template", "check", "broken.json", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_template_show_normalizes() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);

    templex(dir.path())
        .args(["template", "show", "template.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rule\": \"mrz_field\""))
        .stdout(predicate::str::contains("Croatian identity card"));
}

#[test]
fn test_run_old_id_json() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);
    fs::write(dir.path().join("ocr.json"), BACK_SIDE_OCR).unwrap();
    fs::write(dir.path().join("mrz.json"), OLD_ID_MRZ).unwrap();

    templex(dir.path())
        .args(["run", "-t", "template.json", "--ocr", "ocr.json", "--mrz", "mrz.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"class\": \"oldCroId\""))
        .stdout(predicate::str::contains("PU ZAGREBAČKA"))
        .stdout(predicate::str::contains("\"successfully_parsed\": true"));
}

#[test]
fn test_run_without_mrz_is_unclassifiable() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);
    fs::write(dir.path().join("ocr.json"), BACK_SIDE_OCR).unwrap();

    templex(dir.path())
        .args(["run", "-t", "template.json", "--ocr", "ocr.json", "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Class: unclassifiable"));
}

#[test]
fn test_run_csv_to_file() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);
    fs::write(dir.path().join("ocr.json"), BACK_SIDE_OCR).unwrap();
    fs::write(dir.path().join("mrz.json"), r#"{"opt1": "HRV1234567<<<<<"}"#).unwrap();

    templex(dir.path())
        .args([
            "run", "-t", "template.json", "--ocr", "ocr.json", "--mrz", "mrz.json", "-f", "csv",
            "-o", "out.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let csv = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert!(csv.starts_with("class,group,parser,status,value,date\n"));
    assert!(csv.contains("newCroId,DateOfIssue,DateOfIssue,matched,18.04.2017,2017-04-18"));
    assert!(csv.contains("newCroId,IssuedBy,IssuedBy,matched,PU ZAGREBAČKA,"));
}

#[test]
fn test_run_missing_recording() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);

    templex(dir.path())
        .args(["run", "-t", "template.json", "--ocr", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OCR recording not found"));
}

const SIEVED_TEMPLATE: &str = r#"{
    "classes": {"default": [
        {"name": "Number", "position": {"x": 0.1, "y": 0.1, "width": 0.5, "height": 0.2}, "dewarp_height": 100}
    ]},
    "groups": {"Number": [{"name": "sieved", "type": "regex", "pattern": "\\d{4}", "use_sieve": true}]}
}"#;

fn write_frames(dir: &TempDir) {
    fs::write(dir.path().join("sieved.json"), SIEVED_TEMPLATE).unwrap();
    let frames = dir.path().join("frames");
    fs::create_dir_all(&frames).unwrap();
    fs::write(frames.join("01.json"), r#"{"Number": ["1234"]}"#).unwrap();
    fs::write(frames.join("02.json"), r#"{"Number": ["1234"]}"#).unwrap();
    fs::write(frames.join("03.json"), r#"{"Number": ["1284"]}"#).unwrap();
}

#[test]
fn test_run_frames_votes_across_frames() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir);

    templex(dir.path())
        .args(["run", "-t", "sieved.json", "--frames", "frames/*.json", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",Number,sieved,matched,1234,"));
}

#[test]
fn test_run_frames_uses_configured_window() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir);
    fs::write(dir.path().join("cfg.json"), r#"{"engine": {"sieve_window": 1}}"#).unwrap();

    templex(dir.path())
        .args([
            "run", "-c", "cfg.json", "-t", "sieved.json", "--frames", "frames/*.json", "-f", "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(",Number,sieved,matched,1284,"));
}

#[test]
fn test_run_needs_ocr_or_frames() {
    let dir = TempDir::new().unwrap();
    write_frames(&dir);

    templex(dir.path())
        .args(["run", "-t", "sieved.json"])
        .assert()
        .failure();

    templex(dir.path())
        .args(["run", "-t", "sieved.json", "--frames", "missing/*.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No frames found"));
}

#[test]
fn test_batch_with_summary() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);

    let scans = dir.path().join("scans");
    let mrz = dir.path().join("mrz");
    fs::create_dir_all(&scans).unwrap();
    fs::create_dir_all(&mrz).unwrap();

    fs::write(scans.join("first.json"), BACK_SIDE_OCR).unwrap();
    fs::write(scans.join("second.json"), BACK_SIDE_OCR).unwrap();
    fs::write(scans.join("broken.json"), "not json").unwrap();
    fs::write(mrz.join("first.json"), OLD_ID_MRZ).unwrap();

    templex(dir.path())
        .args([
            "batch", "scans/*.json", "-t", "template.json", "--mrz-dir", "mrz", "-o", "out",
            "--summary", "--continue-on-error",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(dir.path().join("out/first.json").exists());
    assert!(!dir.path().join("out/broken.json").exists());

    let summary = fs::read_to_string(dir.path().join("out/summary.csv")).unwrap();
    assert!(summary.contains("first.json,success,oldCroId,3,"));
    assert!(summary.contains("second.json,success,unclassifiable,0,"));
    assert!(summary.contains("broken.json,error,"));
}

#[test]
fn test_batch_stops_on_error() {
    let dir = TempDir::new().unwrap();
    init_template(&dir);
    fs::write(dir.path().join("broken.json"), "[").unwrap();

    templex(dir.path())
        .args(["batch", "broken.json", "-t", "template.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();

    templex(dir.path())
        .args(["config", "set", "engine.sieve_window", "9"])
        .assert()
        .success();

    templex(dir.path())
        .args(["config", "get", "engine.sieve_window"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9"));

    assert!(dir.path().join("xdg/templex/config.json").exists());

    templex(dir.path())
        .args(["config", "set", "engine.unknown", "1"])
        .assert()
        .failure();
}
