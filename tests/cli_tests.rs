// End-to-end tests for the packweight binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TABLE: &str = "\
BatchNumber,Resource,LOT,Timestamp,PackWeight
B1,R1,L1,01/03/2024 08:00:00,100
B1,R1,L1,01/03/2024 08:01:00,110
B2,R1,L2,02/03/2024 08:02:00,120
B2,R2,L2,02/03/2024 09:00:00,200
B2,R2,L2,02/03/2024 09:01:00,204
B3,R2,0,02/03/2024 09:02:00,900
B3,R2,L3,not-a-date,205
";

fn write_table(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("weights.csv");
    fs::write(&path, TABLE).expect("write input");
    path
}

#[test]
fn test_csv_report_by_resource() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir);

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Resource,count,mean,std,min,25%,50%,75%,max,total_deviation\n",
        ))
        .stdout(predicate::str::contains("R1,1,10,NaN,10,10,10,10,10,10\n"))
        .stdout(predicate::str::contains("R2,1,2,NaN,2,2,2,2,2,2\n"))
        .stderr(predicate::str::contains("not-a-date"));
}

#[test]
fn test_csv_report_by_lot_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir);
    let output = dir.path().join("report.csv");

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .args(["--group-by", "lot", "-o"])
        .arg(&output)
        .assert()
        .success();

    let report = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "LOT,count,mean,std,min,25%,50%,75%,max,total_deviation");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("L2,2,6,"), "{report}");
    assert!(lines[1].ends_with(",12"), "{report}");
}

#[test]
fn test_resource_filter_and_window() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir);

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .args(["-r", "R1", "--from", "01/03/2024 00:00:00", "--to", "01/03/2024 23:59:59"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R1,1,5,NaN,5,5,5,5,5,5\n"))
        .stdout(predicate::str::contains("R2").not());
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir);

    let out = Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .args(["--format", "json", "--fixed-target", "100"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["group_by"], "resource");
    let rejected = json["rejected_rows"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["TimestampParse"]["text"], "not-a-date");
    assert_eq!(json["span"]["start"], "2024-03-01T08:00:00");
    assert_eq!(json["span"]["end"], "2024-03-02T09:02:00");
    assert_eq!(json["summaries"][0]["key"], "R1");
    assert_eq!(json["summaries"][0]["count"], 2);
    assert!(json["fit"]["mu"].is_number());

    let profiles = json["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0]["resource_id"], "R1");
    assert_eq!(profiles[0]["box_plot"]["median"], 110.0);
    assert_eq!(profiles[0]["histogram"]["counts"].as_array().unwrap().len(), 20);
    assert_eq!(profiles[1]["resource_id"], "R2");
}

#[test]
fn test_latin1_cell_skips_only_that_row() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("latin1.csv");
    let mut bytes = b"Resource,LOT,Timestamp,PackWeight\n".to_vec();
    bytes.extend_from_slice(b"R1,L1,01/03/2024 08:00:00,100\n");
    bytes.extend_from_slice(b"R1,Lot\xe9,01/03/2024 08:01:00,105\n");
    bytes.extend_from_slice(b"R1,L1,01/03/2024 08:02:00,110\n");
    fs::write(&input, bytes).unwrap();

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("R1,1,5,NaN,5,5,5,5,5,5\n"))
        .stderr(predicate::str::contains("row 1: LOT is not valid UTF-8"));
}

#[test]
fn test_missing_columns_fail() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "Resource,Weight\nR1,100\n").unwrap();

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column"));
}

#[test]
fn test_all_rows_invalid_fail() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "Resource,LOT,Timestamp,PackWeight\nR1,L1,yesterday,100\n").unwrap();

    Command::cargo_bin("packweight")
        .unwrap()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation"));
}
