//! End-to-end tests for the `stepdown` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const CONCEPTS: &str = "\
# log in as <user> with <password>
* open the login page
* enter <user> and <password>
";

const ACCOUNTS: &str = "\
# Accounts

|user|password|
|----|--------|
|ann |pw1     |
|bo  |pw2     |

## Regular users log in
tags: smoke
* log in as <user> with <password>
* see the dashboard

## Administrators
tags: admin, slow
* open the admin console
";

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("write fixture");
}

#[fixture]
fn project() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let specs = dir.path().join("specs");
    fs::create_dir_all(&specs).expect("specs dir");
    write(&specs, "login.cpt", CONCEPTS);
    write(&specs, "accounts.spec", ACCOUNTS);
    dir
}

fn stepdown(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stepdown").expect("binary exists");
    cmd.current_dir(dir.path())
        .env("STEPDOWN_LOG_LEVEL", "error")
        .env_remove("STEPDOWN_DATA_DIR")
        .env_remove("STEPDOWN_CASE_SENSITIVE_TAGS")
        .env_remove("STEPDOWN_SCENARIO_INIT");
    cmd
}

#[rstest]
fn validate_reports_a_summary(project: TempDir) {
    stepdown(&project)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::eq("1 specification, 2 scenarios, 0 errors\n"));
}

#[rstest]
fn validate_fails_on_parse_errors(project: TempDir) {
    write(
        &project.path().join("specs"),
        "broken.spec",
        "# Broken\n## Valid login\n* enter \"admin\" and <pwd>\n",
    );
    stepdown(&project)
        .arg("validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            ":3 Dynamic parameter <pwd> could not be resolved => '* enter \"admin\" and <pwd>'",
        ))
        .stdout(predicate::str::contains("2 specifications, "))
        .stdout(predicate::str::ends_with(", 1 error\n"));
}

#[rstest]
fn malformed_tag_expression_exits_with_usage_status(project: TempDir) {
    stepdown(&project)
        .args(["list", "--tags", "smoke & (slow"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[rstest]
fn invalid_environment_exits_with_usage_status(project: TempDir) {
    stepdown(&project)
        .env("STEPDOWN_SCENARIO_INIT", "sometimes")
        .arg("validate")
        .assert()
        .code(2);
}

#[rstest]
fn list_filters_by_tag(project: TempDir) {
    let output = stepdown(&project)
        .args(["list", "--tags", "!slow"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("Regular users log in (line 8) [smoke]"));
    assert!(!stdout.contains("Administrators"));
}

#[rstest]
fn list_emits_json(project: TempDir) {
    let output = stepdown(&project)
        .args(["list", "--json", "--scenario", "Administrators"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(listing[0]["heading"], "Accounts");
    assert_eq!(listing[0]["scenarios"][0]["heading"], "Administrators");
    assert_eq!(listing[0]["scenarios"][0]["tags"][1], "slow");
    assert!(listing[0]["scenarios"].get(1).is_none());
}

#[rstest]
fn steps_lists_distinct_runner_steps(project: TempDir) {
    stepdown(&project)
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::eq(
            "enter <user> and <password>\nopen the admin console\nopen the login page\nsee the dashboard\n",
        ));
}

#[rstest]
fn plan_resolves_rows_through_concepts(project: TempDir) {
    let output = stepdown(&project)
        .args(["plan", "--tags", "smoke"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let expected = "\
:: Regular users log in (spec row 2)
  * log in as bo with pw2
    * open the login page
    * enter bo and pw2
  * see the dashboard
";
    assert!(stdout.contains(expected), "unexpected plan:\n{stdout}");
    assert_eq!(stdout.matches(":: Regular users log in").count(), 2);
}

#[rstest]
fn plan_json_carries_rows(project: TempDir) {
    let output = stepdown(&project)
        .args(["plan", "--json"])
        .env("STEPDOWN_SCENARIO_INIT", "lazy")
        .output()
        .expect("runs");
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let entries = plan.as_array().expect("array of instances");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["spec_row"], 0);
    assert_eq!(entries[1]["scenario"], "Administrators");
    assert!(entries[1]["spec_row"].is_null());
}

#[test]
fn missing_specs_directory_fails() {
    let dir = TempDir::new().expect("temp dir");
    stepdown(&dir).arg("validate").assert().code(1);
}
