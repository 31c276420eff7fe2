//! Turning `{kind}_tests` module lists into mark intents.

use crate::marks::ExpectedExceptions;
use crate::resolver::ConfigResolver;
use crate::scope::Scope;
use crate::value::Value;
use indexmap::IndexMap;

pub const DEFAULT_REASON: &str = "Marked in Module";

/// One entry of a `*_tests` list, normalized from its raw shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMarkEntry {
    /// `"test_name"` or any non-array value, keyed by its string form.
    Bare(String),
    /// `("test_name", "reason"[, ExceptionKind | (ExceptionKind, ...)])`.
    Detailed {
        name: String,
        reason: Option<String>,
        raises: Option<ExpectedExceptions>,
    },
}

impl RawMarkEntry {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Str(name) => RawMarkEntry::Bare(name.clone()),
            Value::List(parts) => {
                let mut parts = parts.iter();
                RawMarkEntry::Detailed {
                    name: parts.next().map(Value::to_string).unwrap_or_default(),
                    reason: parts.next().map(Value::to_string),
                    raises: parts.next().map(ExpectedExceptions::from_value),
                }
            }
            other => RawMarkEntry::Bare(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RawMarkEntry::Bare(name) => name,
            RawMarkEntry::Detailed { name, .. } => name,
        }
    }

    pub fn into_intent(self, default_reason: &str) -> MarkIntent {
        match self {
            RawMarkEntry::Bare(target_name) => MarkIntent {
                target_name,
                reason: default_reason.to_string(),
                raises: None,
            },
            RawMarkEntry::Detailed {
                name,
                reason,
                raises,
            } => MarkIntent {
                target_name: name,
                reason: reason.unwrap_or_else(|| default_reason.to_string()),
                raises,
            },
        }
    }
}

/// A requested annotation for one test, as configured by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkIntent {
    /// `test_name` or `ClassName.test_name`.
    pub target_name: String,
    pub reason: String,
    pub raises: Option<ExpectedExceptions>,
}

impl MarkIntent {
    /// Exception kinds an expected failure is restricted to.
    pub fn expected_exceptions(&self) -> ExpectedExceptions {
        self.raises.clone().unwrap_or_default()
    }
}

/// Resolve `list_variable` in `scope` and map each target name to its intent.
///
/// A later entry for the same target replaces an earlier one.
pub fn extract_intents<S>(
    resolver: &ConfigResolver<'_>,
    scope: &S,
    list_variable: &str,
    default_reason: &str,
) -> IndexMap<String, MarkIntent>
where
    S: Scope + ?Sized,
{
    let entries = match resolver.resolve_or(scope, list_variable, Value::List(Vec::new())) {
        Value::List(items) => items,
        Value::None => Vec::new(),
        Value::Map(map) => map.into_keys().map(Value::Str).collect(),
        single => vec![single],
    };

    let mut intents = IndexMap::new();
    for entry in &entries {
        let intent = RawMarkEntry::from_value(entry).into_intent(default_reason);
        intents.insert(intent.target_name.clone(), intent);
    }
    intents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::marks::ExceptionKind;
    use crate::scope::ModuleScope;

    #[test]
    fn test_bare_and_detailed_entries() {
        let scope = ModuleScope::new("m").with_variable(
            "skip_tests",
            Value::List(vec![
                Value::from("test_a"),
                Value::from(vec!["TestCls.test_b", "Because"]),
                Value::from(vec!["test_c", "Broken", "ZeroDivisionError"]),
            ]),
        );
        let env = Environment::default();
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "skip_tests",
            DEFAULT_REASON,
        );

        assert_eq!(intents.len(), 3);
        assert_eq!(intents["test_a"].reason, "Marked in Module");
        assert_eq!(
            intents["test_a"].expected_exceptions(),
            ExpectedExceptions::default()
        );
        assert_eq!(intents["TestCls.test_b"].reason, "Because");
        assert_eq!(
            intents["test_c"].raises,
            Some(ExceptionKind::new("ZeroDivisionError").into())
        );
    }

    #[test]
    fn test_detailed_entry_may_name_several_exceptions() {
        let scope = ModuleScope::new("m").with_variable(
            "xfail_tests",
            Value::List(vec![Value::List(vec![
                Value::from("test_lookup"),
                Value::from("Lookup bug"),
                Value::from(vec!["KeyError", "IndexError"]),
            ])]),
        );
        let env = Environment::default();
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "xfail_tests",
            DEFAULT_REASON,
        );

        let raises = intents["test_lookup"].expected_exceptions();
        assert_eq!(
            raises.kinds(),
            &[ExceptionKind::new("KeyError"), ExceptionKind::new("IndexError")]
        );
    }

    #[test]
    fn test_bare_string_value_is_a_single_entry() {
        let scope = ModuleScope::new("m").with_variable("skip_tests", "test_a");
        let env = Environment::default();
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "skip_tests",
            DEFAULT_REASON,
        );

        assert_eq!(intents.len(), 1);
        assert_eq!(intents["test_a"].reason, DEFAULT_REASON);
        assert_eq!(intents["test_a"].raises, None);
    }

    #[test]
    fn test_last_entry_wins() {
        let scope = ModuleScope::new("m").with_variable(
            "xfail_tests",
            Value::List(vec![
                Value::from(vec!["test_a", "first"]),
                Value::from(vec!["test_a", "second"]),
            ]),
        );
        let env = Environment::default();
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "xfail_tests",
            DEFAULT_REASON,
        );
        assert_eq!(intents.len(), 1);
        assert_eq!(intents["test_a"].reason, "second");
    }

    #[test]
    fn test_missing_list_is_empty() {
        let scope = ModuleScope::new("m");
        let env = Environment::default();
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "skip_tests",
            DEFAULT_REASON,
        );
        assert!(intents.is_empty());
    }

    #[test]
    fn test_non_string_entry_falls_back_to_its_string_form() {
        assert_eq!(
            RawMarkEntry::from_value(&Value::Int(42)),
            RawMarkEntry::Bare("42".into())
        );
        let intent = RawMarkEntry::from_value(&Value::from(vec!["test_a"])).into_intent("dflt");
        assert_eq!(intent.reason, "dflt");
    }

    #[test]
    fn test_environment_specific_list() {
        let scope = ModuleScope::new("m")
            .with_variable("skip_tests", vec!["test_generic"])
            .with_variable("skip_tests_someenv", vec!["test_env"]);
        let env = Environment::new("someEnv");
        let intents = extract_intents(
            &ConfigResolver::new(&env),
            &scope,
            "skip_tests",
            DEFAULT_REASON,
        );
        assert!(intents.contains_key("test_env"));
        assert!(!intents.contains_key("test_generic"));
    }
}
