//! Python bindings: a host plugin hands over its collected inventory as
//! JSON and receives the plan back as JSON.

use crate::collection_integration::{build_manager, plan_collection as plan, PlanOptions};
use crate::config::{read_project_config, ProjectConfig};
use crate::environment::{Environment, DEFAULT_ENV};
use crate::hooks::HookRegistry;
use crate::manifest::Manifest;
use crate::resolver::ConfigResolver;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

fn to_py_err(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyfunction]
#[pyo3(signature = (manifest_json, env=None, rootdir=None, htmlpath=None, invocation_args=None))]
fn plan_collection(
    manifest_json: &str,
    env: Option<String>,
    rootdir: Option<PathBuf>,
    htmlpath: Option<String>,
    invocation_args: Option<Vec<String>>,
) -> PyResult<String> {
    let manifest = Manifest::parse(manifest_json).map_err(to_py_err)?;
    let project = match rootdir {
        Some(rootdir) => read_project_config(&rootdir).map_err(to_py_err)?,
        None => ProjectConfig::default(),
    };
    let options = PlanOptions {
        env: Environment::new(env.unwrap_or_else(|| DEFAULT_ENV.to_string())),
        htmlpath,
        invocation_args: invocation_args.unwrap_or_default(),
    };
    let manager =
        build_manager(options, &project, &manifest, &mut HookRegistry::new()).map_err(to_py_err)?;
    serde_json::to_string(&plan(&manifest, &manager)).map_err(to_py_err)
}

/// Variable names probed for `base_name`, highest priority first.
#[pyfunction]
#[pyo3(signature = (base_name, env=None))]
fn probe_names(base_name: &str, env: Option<String>) -> Vec<String> {
    let env = Environment::new(env.unwrap_or_else(|| DEFAULT_ENV.to_string()));
    ConfigResolver::new(&env).probe_names(base_name).to_vec()
}

#[pymodule]
fn _rbaseline(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(plan_collection, m)?)?;
    m.add_function(wrap_pyfunction!(probe_names, m)?)?;
    Ok(())
}
