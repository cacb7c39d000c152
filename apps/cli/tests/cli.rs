//! End-to-end tests for the `rampart` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RULES: &str = r#"
[[fields.name]]
type = "not_blank"

[[fields.iban]]
type = "iban"

[[fields.age]]
type = "comparison"
operator = "greater_than_or_equal"
value = 18
groups = ["adult"]
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rules.toml"), RULES).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, contents: &str) -> &Self {
        fs::write(self.dir.path().join(name), contents).unwrap();
        self
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn rampart(&self) -> Command {
        let mut cmd = Command::cargo_bin("rampart").unwrap();
        cmd.current_dir(self.path())
            .env_remove("RAMPART_LOG")
            .env_remove("RAMPART_CONFIG")
            .env_remove("RAMPART_FORMAT")
            .env_remove("RAMPART_GROUPS");
        cmd
    }
}

// ============================================================================
// CHECK
// ============================================================================

#[test]
fn valid_document_exits_zero() {
    let ws = Workspace::new();
    ws.write("doc.json", r#"{ "name": "Ada", "iban": "GB82 WEST 1234 5698 7654 32" }"#);

    ws.rampart()
        .args(["check", "--rules", "rules.toml", "--input", "doc.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no violations"));
}

#[test]
fn violations_exit_one_and_name_the_path() {
    let ws = Workspace::new();
    ws.write("doc.json", r#"{ "name": "", "iban": "GB00 WEST 1234 5698 7654 32" }"#);

    ws.rampart()
        .args(["check", "--rules", "rules.toml", "--input", "doc.json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("name: This value should not be blank."))
        .stdout(predicate::str::contains("iban: "))
        .stdout(predicate::str::contains("2 violations"));
}

#[test]
fn reads_stdin_and_arrays() {
    let ws = Workspace::new();

    ws.rampart()
        .args(["check", "--rules", "rules.toml"])
        .write_stdin(r#"[{ "name": "Ada" }, { "name": "" }]"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[1] name: "))
        .stdout(predicate::str::contains("[0]").not());
}

#[test]
fn group_flag_selects_rules() {
    let ws = Workspace::new();
    ws.write("doc.json", r#"{ "name": "", "age": 12 }"#);

    ws.rampart()
        .args(["check", "--rules", "rules.toml", "--input", "doc.json", "--group", "adult"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("age: "))
        .stdout(predicate::str::contains("name: ").not());
}

#[test]
fn json_format_is_machine_readable() {
    let ws = Workspace::new();
    ws.write("doc.json", r#"{ "name": "" }"#);

    let output = ws
        .rampart()
        .args(["check", "--rules", "rules.toml", "--input", "doc.json", "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["document"], 0);
    assert_eq!(reports[0]["violations"][0]["property_path"], "name");
    assert_eq!(
        reports[0]["violations"][0]["code"],
        "c1051bb4-d103-4f74-8988-acbcafc7fdc3"
    );
}

#[test]
fn config_file_sets_defaults() {
    let ws = Workspace::new();
    ws.write("rampart.toml", "format = \"json\"\ngroups = [\"adult\"]\n")
        .write("doc.json", r#"{ "age": 30 }"#);

    ws.rampart()
        .args(["check", "--rules", "rules.toml", "--input", "doc.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn environment_overrides_config_file() {
    let ws = Workspace::new();
    ws.write("rampart.toml", "format = \"json\"\n")
        .write("doc.json", r#"{ "name": "Ada" }"#);

    ws.rampart()
        .env("RAMPART_FORMAT", "text")
        .args(["check", "--rules", "rules.toml", "--input", "doc.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no violations"));
}

#[test]
fn broken_rules_exit_two() {
    let ws = Workspace::new();
    ws.write("bad.json", r#"{ "fields": { "name": [{ "type": "length" }] } }"#)
        .write("doc.json", "{}");

    ws.rampart()
        .args(["check", "--rules", "bad.json", "--input", "doc.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid rule file"));
}

#[test]
fn non_object_document_exits_two() {
    let ws = Workspace::new();

    ws.rampart()
        .args(["check", "--rules", "rules.toml"])
        .write_stdin("42")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("document 0"));
}

#[test]
fn missing_config_file_exits_two() {
    let ws = Workspace::new();

    ws.rampart()
        .args(["--config", "nope.toml", "codes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope.toml"));
}

// ============================================================================
// CODES / EXPLAIN
// ============================================================================

#[test]
fn codes_can_be_filtered() {
    Workspace::new()
        .rampart()
        .args(["codes", "--filter", "too_short"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Length::TOO_SHORT_ERROR"))
        .stdout(predicate::str::contains("Iban::").not());
}

#[test]
fn explain_names_the_constant() {
    Workspace::new()
        .rampart()
        .args(["explain", "9ff3fdc4-b214-49db-8718-39c315e33d45"])
        .assert()
        .success()
        .stdout("Length::TOO_SHORT_ERROR\n");
}

#[test]
fn explain_unknown_code_fails() {
    Workspace::new()
        .rampart()
        .args(["explain", "not-a-code"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown error code"));
}
