// Command::cargo_bin is deprecated in favor of the cargo_bin! macro.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SAVE: &str = r#"
date = "1600.1.1"
SWE = { capital = 1 primary_culture = swedish }
DAN = { capital = 12 }
TIM = { }
REB = { }
1 = { name = "Uppland" owner = "SWE" core = "SWE" base_tax = 5.000 trade_goods = grain }
12 = { name = "Sjaelland" owner = "DAN" base_tax = 4.000 trade_goods = fish }
"#;

const RULES: &str = r#"
mappings = {
    link = { eu3 = SWE vic = SWE }
}
"#;

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("save.eu3"), SAVE).unwrap();
    fs::write(dir.path().join("rules.txt"), RULES).unwrap();
    dir
}

fn eu3tov2() -> Command {
    Command::cargo_bin("eu3tov2").unwrap()
}

#[test]
fn test_help_flag() {
    eu3tov2()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--rules"));
}

#[test]
fn test_text_report() {
    let dir = fixture();
    eu3tov2()
        .arg(dir.path().join("save.eu3"))
        .arg("--rules")
        .arg(dir.path().join("rules.txt"))
        .args(["--dest-tags", "SWE,DEN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SWE -> SWE (default destination entity)"))
        .stdout(predicate::str::contains("DAN -> X00 (generated tag)"))
        .stdout(predicate::str::contains("--- REMOVED ---"))
        .stdout(predicate::str::contains("TIM"));
}

#[test]
fn test_json_report_to_file() {
    let dir = fixture();
    let output = dir.path().join("report.json");
    eu3tov2()
        .arg(dir.path().join("save.eu3"))
        .arg("--rules")
        .arg(dir.path().join("rules.txt"))
        .args(["--eu3-gametype", "dw", "--json", "--output"])
        .arg(&output)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["world_type"], "DivineWind");
    assert_eq!(report["mapping"]["SWE"], "SWE");
    assert_eq!(report["mapping"]["DAN"], "X00");
    assert_eq!(report["removed_countries"][0], "TIM");
}

#[test]
fn test_missing_rules_fails() {
    let dir = fixture();
    eu3tov2()
        .arg(dir.path().join("save.eu3"))
        .arg("--rules")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_missing_save_fails() {
    eu3tov2()
        .arg("/nonexistent/save.eu3")
        .arg("--rules")
        .arg("/nonexistent/rules.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load save"));
}

#[test]
fn test_missing_config_names_the_file() {
    let dir = fixture();
    eu3tov2()
        .arg(dir.path().join("save.eu3"))
        .arg("--rules")
        .arg(dir.path().join("rules.txt"))
        .arg("--config")
        .arg(dir.path().join("configuration.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"))
        .stderr(predicate::str::contains("configuration.txt"));
}

#[test]
fn test_dest_tags_conflict_with_v2_path() {
    let dir = fixture();
    eu3tov2()
        .arg(dir.path().join("save.eu3"))
        .arg("--rules")
        .arg(dir.path().join("rules.txt"))
        .args(["--dest-tags", "SWE", "--v2-path", "/games/v2"])
        .assert()
        .failure();
}
