//! Common test utilities and helpers.

use rbaseline::outcome::TestStatus;
use rbaseline::{
    build_manager, plan_collection, CollectionPlan, Environment, HookRegistry, Manifest,
    PlanOptions, ProjectConfig,
};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Creates a temporary project directory holding the given files.
///
/// Keys are paths relative to the project root, values are file contents.
#[allow(dead_code)]
pub fn create_test_project_with_files(files: HashMap<&str, &str>) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let project_path = temp_dir.path().join("test_project");
    fs::create_dir_all(&project_path).expect("Failed to create project directory");

    for (file_path, content) in files {
        let full_path = project_path.join(file_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create file {file_path}: {e}"));
        file.write_all(content.as_bytes())
            .unwrap_or_else(|e| panic!("Failed to write file {file_path}: {e}"));
    }

    (temp_dir, project_path)
}

/// Runs one collection pass over `manifest_json` with no project settings.
#[allow(dead_code)]
pub fn plan_for(manifest_json: &str, env: &str) -> CollectionPlan {
    let manifest = Manifest::parse(manifest_json).expect("Failed to parse manifest");
    let options = PlanOptions {
        env: Environment::new(env),
        ..PlanOptions::default()
    };
    let manager = build_manager(
        options,
        &ProjectConfig::default(),
        &manifest,
        &mut HookRegistry::new(),
    )
    .expect("Failed to build manager");
    plan_collection(&manifest, &manager)
}

/// Setup status of the planned item called `name`.
#[allow(dead_code)]
pub fn setup_of<'a>(plan: &'a CollectionPlan, name: &str) -> Option<&'a TestStatus> {
    plan.items
        .iter()
        .find(|planned| planned.item.name == name)
        .unwrap_or_else(|| panic!("no planned item named {name}"))
        .setup
        .as_ref()
}

/// Path to the compiled rbaseline binary.
#[allow(dead_code)]
pub fn get_rbaseline_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rbaseline"))
}

/// Runs the rbaseline binary inside `project_path`.
#[allow(dead_code)]
pub fn run_rbaseline(project_path: &Path, args: &[&str]) -> Output {
    Command::new(get_rbaseline_binary())
        .args(args)
        .current_dir(project_path)
        .output()
        .expect("Failed to execute rbaseline")
}

#[allow(dead_code)]
pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
