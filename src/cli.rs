use crate::environment::DEFAULT_ENV;
use crate::error::{BaselineError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Environment to run against; selects `_{ENV}` module variables and `env` marks
    #[arg(long, default_value = DEFAULT_ENV)]
    pub env: String,

    /// Project root holding pyproject.toml or pytest.ini
    #[arg(long, default_value = ".")]
    pub rootdir: PathBuf,

    /// HTML report path; `{date}` and `{env}` are substituted
    #[arg(long)]
    pub htmlpath: Option<String>,

    /// Print the collection plan as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Collection manifests (JSON); glob patterns are expanded
    #[arg(required = true)]
    pub manifests: Vec<String>,

    /// Arguments the host was invoked with, recorded in run metadata
    #[arg(last = true)]
    pub pytest_args: Vec<String>,
}

impl Args {
    /// Manifest paths with glob patterns expanded, in argument order.
    pub fn manifest_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for pattern in &self.manifests {
            let matches = glob::glob(pattern).map_err(|e| BaselineError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            let before = paths.len();
            for entry in matches {
                let path = entry.map_err(|e| BaselineError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                paths.push(path);
            }
            if paths.len() == before {
                // Not a pattern that matched anything; let loading report it.
                paths.push(PathBuf::from(pattern));
            }
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parsing_defaults() {
        let args = Args::parse_from(["rbaseline", "manifest.json"]);

        assert_eq!(args.env, "DEFAULT");
        assert_eq!(args.rootdir, PathBuf::from("."));
        assert!(args.htmlpath.is_none());
        assert!(!args.json);
        assert_eq!(args.manifests, vec!["manifest.json"]);
        assert!(args.pytest_args.is_empty());
    }

    #[test]
    fn test_cli_parsing_with_env() {
        let args = Args::parse_from(["rbaseline", "--env=someEnv", "manifest.json"]);

        assert_eq!(args.env, "someEnv");
    }

    #[test]
    fn test_cli_parsing_with_pytest_args() {
        let args = Args::parse_from(["rbaseline", "m.json", "--", "-v", "--env=dev", "tests/"]);

        assert_eq!(args.pytest_args, vec!["-v", "--env=dev", "tests/"]);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let args = Args::parse_from([
            "rbaseline",
            "--env",
            "stage",
            "--rootdir",
            "project",
            "--htmlpath",
            "reports/{env}.html",
            "--json",
            "a.json",
            "b.json",
        ]);

        assert_eq!(args.env, "stage");
        assert_eq!(args.rootdir, PathBuf::from("project"));
        assert_eq!(args.htmlpath.as_deref(), Some("reports/{env}.html"));
        assert!(args.json);
        assert_eq!(args.manifests, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_cli_requires_manifest() {
        assert!(Args::try_parse_from(["rbaseline"]).is_err());
    }

    #[test]
    fn test_manifest_paths_expand_globs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let pattern = dir.path().join("*.json").to_string_lossy().into_owned();
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();

        let args = Args::parse_from(["rbaseline", pattern.as_str(), missing.as_str()]);
        let paths = args.manifest_paths().unwrap();

        assert_eq!(
            paths,
            vec![
                dir.path().join("a.json"),
                dir.path().join("b.json"),
                dir.path().join("missing.json"),
            ]
        );
    }

    #[test]
    fn test_manifest_paths_reject_bad_pattern() {
        let args = Args::parse_from(["rbaseline", "[unclosed"]);
        assert!(matches!(
            args.manifest_paths(),
            Err(BaselineError::Pattern { .. })
        ));
    }

    #[test]
    fn test_cli_help_generation() {
        let mut cmd = Args::command();
        let help = cmd.render_help();

        assert!(help.to_string().contains("--env"));
        assert!(help.to_string().contains("htmlpath"));
        assert!(help.to_string().contains("PYTEST_ARGS"));
    }
}
