//! Runtime helpers available to tests: the active environment and
//! module-variable lookup.

use crate::environment::Environment;
use crate::error::Skipped;
use crate::resolver::ConfigResolver;
use crate::scope::Scope;
use crate::value::Value;

/// Looks up variables of the module a test was collected from.
///
/// Lookups honour `_{ENV}` overrides like every other module variable.
pub struct ModuleVariable<'a> {
    scope: &'a dyn Scope,
    resolver: ConfigResolver<'a>,
}

impl<'a> ModuleVariable<'a> {
    pub fn new(scope: &'a dyn Scope, env: &'a Environment) -> Self {
        Self {
            scope,
            resolver: ConfigResolver::new(env),
        }
    }

    /// The variable's value, `default` when undefined, or a skip when
    /// undefined and `skip_if_not_defined` is set.
    pub fn get(
        &self,
        name: &str,
        default: Option<Value>,
        skip_if_not_defined: bool,
    ) -> Result<Value, Skipped> {
        self.resolver.resolve(
            self.scope,
            name,
            default.unwrap_or_default(),
            skip_if_not_defined,
        )
    }

    pub fn get_or_none(&self, name: &str) -> Value {
        self.resolver.resolve_or(self.scope, name, Value::None)
    }

    pub fn env(&self) -> &'a Environment {
        self.resolver.env()
    }
}
