//! JSON inventory a host hands over after collection.
//!
//! ```json
//! {
//!   "markers": ["tt2: mark tests to run for only Tiger Team 2 Views"],
//!   "parametrized_variables": [{"root": "paramed_var", "skip": []}],
//!   "modules": [{
//!     "name": "tests.test_views",
//!     "path": "tests/test_views.py",
//!     "variables": {"skip_tests": ["test_list"]},
//!     "functions": [{"name": "test_list", "class": null, "fixtures": [], "marks": []}]
//!   }]
//! }
//! ```

use crate::config::ParametrizedVariableSetting;
use crate::error::{BaselineError, Result};
use crate::item::{node_id, CollectedItem};
use crate::marks::Mark;
use crate::scope::ModuleScope;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Extra `name(args): description` marker lines.
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub parametrized_variables: Vec<ParametrizedVariableSetting>,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    /// File path used for node ids; the dotted name is used when absent.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, Value>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub fixtures: Vec<String>,
    #[serde(default)]
    pub marks: Vec<MarkEntry>,
    #[serde(default)]
    pub doc: Option<String>,
}

/// A decorator mark as the host saw it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarkEntry {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: IndexMap<String, Value>,
}

impl MarkEntry {
    pub fn to_mark(&self) -> Mark {
        Mark::from_host(&self.name, &self.args, &self.kwargs)
    }
}

impl ModuleEntry {
    pub fn scope(&self) -> ModuleScope {
        ModuleScope {
            name: self.name.clone(),
            variables: self.variables.clone(),
        }
    }

    fn node_prefix(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    /// The unparametrized item for `function`.
    pub fn item(&self, function: &FunctionEntry) -> CollectedItem {
        self.named_item(function, &function.name)
    }

    /// An item for `function` under `name`, e.g. `test_x[hello]`.
    pub fn named_item(&self, function: &FunctionEntry, name: &str) -> CollectedItem {
        let class_name = function.class_name.as_deref();
        let mut item = CollectedItem::new(self.name.as_str(), class_name, name)
            .with_fixtures(function.fixtures.iter().cloned());
        item.nodeid = node_id(self.node_prefix(), class_name, name);
        item.doc = function.doc.clone();
        item.marks = function.marks.iter().map(MarkEntry::to_mark).collect();
        item
    }
}

impl Manifest {
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|source| BaselineError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append everything from `other`. A module already present keeps its
    /// variables; its functions are extended.
    pub fn merge(&mut self, other: Manifest) {
        for line in other.markers {
            if !self.markers.contains(&line) {
                self.markers.push(line);
            }
        }
        self.parametrized_variables
            .extend(other.parametrized_variables);
        for module in other.modules {
            match self.modules.iter_mut().find(|m| m.name == module.name) {
                Some(existing) => existing.functions.extend(module.functions),
                None => self.modules.push(module),
            }
        }
    }

    pub fn scopes(&self) -> IndexMap<String, ModuleScope> {
        self.modules
            .iter()
            .map(|module| (module.name.clone(), module.scope()))
            .collect()
    }

    pub fn function_count(&self) -> usize {
        self.modules.iter().map(|m| m.functions.len()).sum()
    }
}
