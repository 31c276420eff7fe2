//! Extension hooks registered by conftest-style plugins.
//!
//! Plugins are registered explicitly and consulted in registration order
//! when the manager is built.

use crate::parametrize::ParametrizedVariable;
use crate::report::FixtureExtraList;

/// Callbacks a plugin can provide. Every method defaults to doing nothing.
pub trait BaselinePlugin {
    /// Logo lines printed at the top of the run header.
    fn client_logo(&self) -> Option<String> {
        None
    }

    /// Append descriptors for `{root}_data` / `{root}_value` parametrization.
    fn parametrized_module_variable_info(&self, _module_variable_info: &mut Vec<ParametrizedVariable>) {}

    /// Append fixtures to include on the HTML report.
    fn fixtures_add_to_report(&self, _fixtures_extra_config: &mut FixtureExtraList) {}
}

/// Plugins in registration order.
#[derive(Default)]
pub struct HookRegistry {
    plugins: Vec<Box<dyn BaselinePlugin>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: BaselinePlugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Box::new(plugin));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// All non-empty logos, joined by newlines.
    pub fn client_logo(&self) -> String {
        self.plugins
            .iter()
            .filter_map(|plugin| plugin.client_logo())
            .filter(|logo| !logo.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn parametrized_module_variable_info(&self) -> Vec<ParametrizedVariable> {
        let mut info = Vec::new();
        for plugin in &self.plugins {
            plugin.parametrized_module_variable_info(&mut info);
        }
        info
    }

    pub fn fixtures_add_to_report(&self) -> FixtureExtraList {
        let mut extras = FixtureExtraList::new();
        for plugin in &self.plugins {
            plugin.fixtures_add_to_report(&mut extras);
        }
        extras
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

/// Plugin assembled from plain data, used for `[tool.rbaseline]` settings
/// and manifest-supplied descriptors.
#[derive(Debug, Default, Clone)]
pub struct StaticPlugin {
    pub logo: Option<String>,
    pub parametrized_variables: Vec<ParametrizedVariable>,
}

impl BaselinePlugin for StaticPlugin {
    fn client_logo(&self) -> Option<String> {
        self.logo.clone()
    }

    fn parametrized_module_variable_info(&self, module_variable_info: &mut Vec<ParametrizedVariable>) {
        module_variable_info.extend(self.parametrized_variables.iter().cloned());
    }
}
