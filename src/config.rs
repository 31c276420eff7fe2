//! Run configuration and project settings.
//!
//! Registered markers are read the way the host reads them: from
//! `[tool.pytest.ini_options]` in `pyproject.toml`, or from the `[pytest]`
//! section of `pytest.ini`. Engine settings live under `[tool.rbaseline]`.

use crate::environment::Environment;
use crate::error::{BaselineError, Result};
use crate::marks::{MarkerRegistry, ENV_MARKER_LINE};
use crate::parametrize::ParametrizedVariable;
use crate::value::Value;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const INVOKING_COMMAND_MAX_LEN: usize = 250;

/// One `[[tool.rbaseline.parametrized_variables]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParametrizedVariableSetting {
    pub root: String,
    #[serde(default)]
    pub skip: Value,
    #[serde(default)]
    pub indirect: bool,
}

impl ParametrizedVariableSetting {
    pub fn to_descriptor(&self) -> Result<ParametrizedVariable> {
        Ok(ParametrizedVariable::new(self.root.clone(), self.skip.clone())?.with_indirect(self.indirect))
    }
}

/// `[tool.rbaseline]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BaselineSettings {
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub htmlpath: Option<String>,
    #[serde(default)]
    pub parametrized_variables: Vec<ParametrizedVariableSetting>,
}

/// Settings read from the project root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    pub markers: Vec<String>,
    pub settings: BaselineSettings,
}

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: PyProjectTool,
}

#[derive(Debug, Default, Deserialize)]
struct PyProjectTool {
    #[serde(default)]
    pytest: Option<PytestTool>,
    #[serde(default)]
    rbaseline: Option<BaselineSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct PytestTool {
    #[serde(default)]
    ini_options: Option<PytestIniOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct PytestIniOptions {
    #[serde(default)]
    markers: Vec<String>,
}

/// Read markers and engine settings from `rootdir`.
///
/// A missing file is not an error; an unparsable one is.
pub fn read_project_config(rootdir: &Path) -> Result<ProjectConfig> {
    let pyproject_path = rootdir.join("pyproject.toml");
    if pyproject_path.is_file() {
        let content = fs::read_to_string(&pyproject_path)?;
        let pyproject: PyProject = toml::from_str(&content).map_err(|source| BaselineError::Config {
            path: pyproject_path.clone(),
            source,
        })?;
        let markers = pyproject
            .tool
            .pytest
            .and_then(|pytest| pytest.ini_options)
            .map(|options| options.markers)
            .unwrap_or_default();
        let settings = pyproject.tool.rbaseline.unwrap_or_default();
        if !markers.is_empty() || settings != BaselineSettings::default() {
            return Ok(ProjectConfig { markers, settings });
        }
    }

    let ini_path = rootdir.join("pytest.ini");
    if ini_path.is_file() {
        let content = fs::read_to_string(&ini_path)?;
        return Ok(ProjectConfig {
            markers: parse_ini_markers(&content, "pytest"),
            settings: BaselineSettings::default(),
        });
    }

    Ok(ProjectConfig::default())
}

/// Marker lines from the `markers` key of an ini `[section]`.
pub fn parse_ini_markers(content: &str, section: &str) -> Vec<String> {
    let header = format!("[{section}]");
    let mut in_section = false;
    let mut in_markers = false;
    let mut markers = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_section = trimmed == header;
            in_markers = false;
            continue;
        }
        if !in_section || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        let continuation = line.starts_with(char::is_whitespace);
        if continuation && in_markers {
            if !trimmed.is_empty() {
                markers.push(trimmed.to_string());
            }
            continue;
        }
        in_markers = false;
        if let Some((key, value)) = trimmed.split_once('=') {
            if key.trim() == "markers" {
                in_markers = true;
                let value = value.trim();
                if !value.is_empty() {
                    markers.push(value.to_string());
                }
            }
        }
    }
    markers
}

/// Everything the manager needs to know about the run.
#[derive(Debug, Clone)]
pub struct BaselineConfig {
    pub env: Environment,
    pub markers: MarkerRegistry,
    /// HTML report path; enrichment is only done when set.
    pub htmlpath: Option<String>,
    pub invocation_args: Vec<String>,
    pub metadata: IndexMap<String, String>,
}

impl BaselineConfig {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            markers: MarkerRegistry::with_builtins(),
            htmlpath: None,
            invocation_args: Vec::new(),
            metadata: IndexMap::new(),
        }
    }

    pub fn with_htmlpath(mut self, htmlpath: impl Into<String>) -> Self {
        self.htmlpath = Some(htmlpath.into());
        self
    }

    pub fn with_invocation_args(mut self, args: Vec<String>) -> Self {
        self.invocation_args = args;
        self
    }

    pub fn add_marker_line(&mut self, line: impl Into<String>) -> Result<()> {
        self.markers.add_line(line)
    }

    pub fn has_html(&self) -> bool {
        self.htmlpath.is_some()
    }

    /// Record run metadata, expand `{date}`/`{env}` in the html path and
    /// register the `env` marker.
    pub fn configure(&mut self, now: DateTime<Local>) -> Result<()> {
        self.metadata
            .insert("Environment".into(), self.env.name().to_string());
        let command = format!("pytest {}", self.invocation_args.join(" "));
        self.metadata.insert(
            "Invoking Command".into(),
            command.chars().take(INVOKING_COMMAND_MAX_LEN).collect(),
        );
        self.metadata.insert(
            "Start Time".into(),
            now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        );

        if let Some(htmlpath) = &self.htmlpath {
            let formatted = htmlpath
                .replace("{date}", &now.format("%Y-%m-%dT%H-%M").to_string())
                .replace("{env}", self.env.name());
            log::debug!("html report path: {formatted}");
            self.htmlpath = Some(formatted);
        }

        self.markers.add_line(ENV_MARKER_LINE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use indoc::indoc;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 30).unwrap()
    }

    #[test]
    fn test_read_pyproject_markers_and_settings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            indoc! {r#"
                [tool.pytest.ini_options]
                markers = [
                    "tt2: mark tests to run for only Tiger Team 2 Views",
                ]

                [tool.rbaseline]
                logo = "ACME QA"

                [[tool.rbaseline.parametrized_variables]]
                root = "paramed_var"
                skip = []
            "#},
        )
        .unwrap();

        let config = read_project_config(dir.path()).unwrap();
        assert_eq!(
            config.markers,
            vec!["tt2: mark tests to run for only Tiger Team 2 Views"]
        );
        assert_eq!(config.settings.logo.as_deref(), Some("ACME QA"));
        let descriptor = config.settings.parametrized_variables[0]
            .to_descriptor()
            .unwrap();
        assert_eq!(descriptor.root_name(), "paramed_var");
        assert_eq!(descriptor.skip_sentinel(), &Value::List(Vec::new()));
    }

    #[test]
    fn test_read_pytest_ini_markers() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pytest.ini"),
            indoc! {"
                [pytest]
                addopts = -ra
                markers =
                    slow: marks tests as slow
                    tt2: tiger team 2
                testpaths = tests
            "},
        )
        .unwrap();

        let config = read_project_config(dir.path()).unwrap();
        assert_eq!(
            config.markers,
            vec!["slow: marks tests as slow", "tt2: tiger team 2"]
        );
    }

    #[test]
    fn test_missing_config_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_project_config(dir.path()).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_invalid_pyproject_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[tool.pytest.ini_options\n").unwrap();
        assert!(matches!(
            read_project_config(dir.path()),
            Err(BaselineError::Config { .. })
        ));
    }

    #[test]
    fn test_configure_metadata_and_htmlpath() {
        let mut config = BaselineConfig::new(Environment::new("stage"))
            .with_htmlpath("reports/{env}_{date}.html")
            .with_invocation_args(vec!["-v".into(), "--env=stage".into()]);

        config.configure(fixed_time()).unwrap();

        assert_eq!(config.metadata["Environment"], "stage");
        assert_eq!(config.metadata["Invoking Command"], "pytest -v --env=stage");
        assert_eq!(config.metadata["Start Time"], "2024-03-09T14:05:30");
        assert_eq!(
            config.htmlpath.as_deref(),
            Some("reports/stage_2024-03-09T14-05.html")
        );
        assert!(config.markers.is_registered("env"));
    }

    #[test]
    fn test_invoking_command_is_truncated() {
        let mut config = BaselineConfig::new(Environment::default())
            .with_invocation_args(vec!["x".repeat(400)]);
        config.configure(fixed_time()).unwrap();
        assert_eq!(config.metadata["Invoking Command"].len(), 250);
    }
}
