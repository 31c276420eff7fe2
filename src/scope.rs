//! Key-value access to the variables a test module defines.

use crate::value::Value;
use indexmap::IndexMap;

/// Anything that can answer "is this variable defined, and what is it".
pub trait Scope {
    /// Name used in diagnostics, normally the module's dotted name.
    fn scope_name(&self) -> &str;

    fn get(&self, key: &str) -> Option<&Value>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The module-level variables of one test module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleScope {
    pub name: String,
    pub variables: IndexMap<String, Value>,
}

impl ModuleScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: IndexMap::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }
}

impl Scope for ModuleScope {
    fn scope_name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }
}

/// Lookup of module scopes by module name.
pub trait ScopeProvider {
    fn module_scope(&self, module: &str) -> Option<&dyn Scope>;
}

impl ScopeProvider for IndexMap<String, ModuleScope> {
    fn module_scope(&self, module: &str) -> Option<&dyn Scope> {
        self.get(module).map(|scope| scope as &dyn Scope)
    }
}

/// Stand-in for a module the host knows nothing about.
#[derive(Debug)]
pub(crate) struct EmptyScope<'a> {
    pub name: &'a str,
}

impl Scope for EmptyScope<'_> {
    fn scope_name(&self) -> &str {
        self.name
    }

    fn get(&self, _key: &str) -> Option<&Value> {
        None
    }
}
