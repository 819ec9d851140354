mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::temp_config_file;

fn crisis_coach() -> Command {
    let mut cmd = Command::cargo_bin("crisis-coach").unwrap();
    for name in [
        "BIGMODEL_API_KEY",
        "OPENAI_API_KEY",
        "BIGMODEL_MODEL",
        "OPENAI_MODEL",
        "BIGMODEL_BASE_URL",
        "CRISIS_COACH_TIMEOUT_SECONDS",
        "CRISIS_COACH_PORT",
        "RUST_LOG",
    ] {
        cmd.env_remove(name);
    }
    cmd
}

#[test]
fn test_cases_json_is_clean_json() {
    let (_dir, config_path) = temp_config_file("model:\n  name: glm-test\n");

    let output = crisis_coach()
        .args(["--config", config_path.to_str().unwrap(), "cases", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let cases: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = cases
        .as_array()
        .unwrap()
        .iter()
        .map(|case| case["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), crisis_coach::CASES.len());
    assert!(ids.contains(&"postpartum_overwhelm"));
}

#[test]
fn test_json_logs_flag_writes_json_lines_to_stderr() {
    let (_dir, config_path) = temp_config_file("{}\n");

    let output = crisis_coach()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--verbose",
            "cases",
            "--json",
            "--json-logs",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let _: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|line| line.contains("Listing cases"))
        .expect("debug log line on stderr");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "DEBUG");
    assert_eq!(event["fields"]["message"], "Listing cases (json: true)");
}

#[test]
fn test_cases_table_lists_ids() {
    let (_dir, config_path) = temp_config_file("{}\n");

    crisis_coach()
        .args(["--config", config_path.to_str().unwrap(), "cases"])
        .assert()
        .success()
        .stdout(predicate::str::contains("burnout_healthcare_worker"))
        .stdout(predicate::str::contains("Case ID"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let (_dir, config_path) = temp_config_file("model:\n  base_url: ftp://example.com\n");

    crisis_coach()
        .args(["--config", config_path.to_str().unwrap(), "cases"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http:// or https://"));
}

#[test]
fn test_practice_without_key_fails() {
    let (_dir, config_path) = temp_config_file("{}\n");

    crisis_coach()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "practice",
            "--case",
            "postpartum_overwhelm",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing BIGMODEL_API_KEY"));
}

#[test]
fn test_practice_unknown_case_fails() {
    let (_dir, config_path) = temp_config_file("{}\n");

    crisis_coach()
        .args(["--config", config_path.to_str().unwrap(), "practice", "--case", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown case id: nope"));
}

#[test]
fn test_missing_subcommand_shows_usage() {
    crisis_coach()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
