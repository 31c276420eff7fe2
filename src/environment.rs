//! The active test environment selected with `--env`.

use std::fmt;

pub const DEFAULT_ENV: &str = "DEFAULT";

/// Environment name for the whole run.
///
/// Built once from the command line and passed by reference to every
/// component that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suffixes probed when resolving `{name}_{suffix}` variables, most
    /// specific first.
    pub fn suffixes(&self) -> [String; 2] {
        [self.name.to_uppercase(), self.name.to_lowercase()]
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_ENV)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_environment() {
        assert_eq!(Environment::default().name(), "DEFAULT");
    }

    #[test]
    fn test_suffixes_upper_then_lower() {
        let env = Environment::new("someEnv");
        assert_eq!(env.suffixes(), ["SOMEENV".to_string(), "someenv".to_string()]);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let env = Environment::new("dev");
        assert!(env.is("dev"));
        assert!(!env.is("DEV"));
    }
}
