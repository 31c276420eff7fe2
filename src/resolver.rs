//! Environment-aware resolution of module variables.
//!
//! A variable `name` may be overridden per environment by defining
//! `name_{ENV}` (upper case) or `name_{env}` (lower case) next to it. The
//! most specific definition wins.

use crate::environment::Environment;
use crate::error::Skipped;
use crate::scope::Scope;
use crate::value::Value;
use log::debug;

#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    env: &'a Environment,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &'a Environment {
        self.env
    }

    /// Candidate variable names in priority order.
    pub fn probe_names(&self, base_name: &str) -> [String; 3] {
        let [upper, lower] = self.env.suffixes();
        [
            format!("{base_name}_{upper}"),
            format!("{base_name}_{lower}"),
            base_name.to_string(),
        ]
    }

    /// The most environment-specific value defined in `scope`, if any.
    pub fn lookup<'s, S>(&self, scope: &'s S, base_name: &str) -> Option<&'s Value>
    where
        S: Scope + ?Sized,
    {
        for name in self.probe_names(base_name) {
            if let Some(value) = scope.get(&name) {
                debug!("resolved `{base_name}` as `{name}` in `{}`", scope.scope_name());
                return Some(value);
            }
        }
        None
    }

    /// Resolve `base_name`, falling back to `default`, or asking for a skip
    /// when nothing is defined and `skip_if_missing` is set.
    pub fn resolve<S>(
        &self,
        scope: &S,
        base_name: &str,
        default: Value,
        skip_if_missing: bool,
    ) -> Result<Value, Skipped>
    where
        S: Scope + ?Sized,
    {
        match self.lookup(scope, base_name) {
            Some(value) => Ok(value.clone()),
            None if skip_if_missing => Err(Skipped::new(format!(
                "`{base_name}` not defined for `{}`",
                scope.scope_name()
            ))),
            None => Ok(default),
        }
    }

    /// Resolve `base_name`, never skipping.
    pub fn resolve_or<S>(&self, scope: &S, base_name: &str, default: Value) -> Value
    where
        S: Scope + ?Sized,
    {
        self.lookup(scope, base_name).cloned().unwrap_or(default)
    }
}
