//! Tests for the rbaseline binary.

mod common;

use common::{create_test_project_with_files, run_rbaseline, stdout_of};
use indoc::indoc;
use std::collections::HashMap;

const VIEWS_MANIFEST: &str = indoc! {r#"
    {
      "modules": [{
        "name": "tests.test_views",
        "path": "tests/test_views.py",
        "variables": {
          "skip_tests": [["test_list", "Flaky on CI"]],
          "skip_tests_someenv": [["test_marker", "Because"]],
          "tt2_tests": ["TestDetail.test_typo"]
        },
        "functions": [
          {"name": "test_list"},
          {"name": "test_marker"},
          {"name": "test_get", "class": "TestDetail"},
          {"name": "test_stage", "marks": [{"name": "env", "args": ["stage"]}]}
        ]
      }]
    }
"#};

const PYPROJECT: &str = indoc! {r#"
    [tool.pytest.ini_options]
    markers = [
        "tt2: mark tests to run for only Tiger Team 2 Views",
    ]

    [tool.rbaseline]
    logo = "ACME QA"
"#};

fn project() -> (tempfile::TempDir, std::path::PathBuf) {
    let mut files = HashMap::new();
    files.insert("collected/views.json", VIEWS_MANIFEST);
    files.insert("pyproject.toml", PYPROJECT);
    create_test_project_with_files(files)
}

#[test]
fn test_summary_output() {
    let (_temp_dir, project_path) = project();

    let output = run_rbaseline(&project_path, &["collected/*.json"]);
    let stdout = stdout_of(&output);

    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.starts_with("ACME QA\n\n"));
    assert!(stdout.contains("collected 4 items / 2 skipped / 1 warning"));
    assert!(stdout.contains("tests/test_views.py::test_list SKIPPED (Flaky on CI)"));
    assert!(stdout.contains("tests/test_views.py::test_stage SKIPPED (test requires env in ['stage'])"));
    assert!(stdout.contains("warnings summary"));
    assert!(stdout.contains("tests.test_views.TestDetail.test_typo"));
}

#[test]
fn test_env_option_selects_suffixed_lists() {
    let (_temp_dir, project_path) = project();

    let output = run_rbaseline(&project_path, &["--env=someEnv", "collected/views.json"]);
    let stdout = stdout_of(&output);

    assert!(output.status.success());
    assert!(stdout.contains("tests/test_views.py::test_marker SKIPPED (Because)"));
    assert!(!stdout.contains("Flaky on CI"));
}

#[test]
fn test_json_output() {
    let (_temp_dir, project_path) = project();

    let output = run_rbaseline(
        &project_path,
        &["--json", "--env", "stage", "collected/views.json", "--", "-v"],
    );
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(plan["env"], "stage");
    assert_eq!(plan["metadata"]["Invoking Command"], "pytest -v");
    assert_eq!(plan["items"].as_array().unwrap().len(), 4);
    assert_eq!(plan["items"][3]["nodeid"], "tests/test_views.py::test_stage");
    assert!(plan["items"][3]["setup"].is_null());
    assert_eq!(plan["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn test_unreadable_manifest_fails() {
    let mut files = HashMap::new();
    files.insert("broken.json", "{\"modules\": [");
    let (_temp_dir, project_path) = create_test_project_with_files(files);

    let output = run_rbaseline(&project_path, &["broken.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken.json"));
}
