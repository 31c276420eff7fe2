//! Marker kinds, concrete marks and the marker registry.

use crate::error::{BaselineError, Result};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exception kind an expected failure must raise when none is configured.
pub const DEFAULT_EXCEPTION: &str = "AssertionError";

/// Markers that structure collection rather than annotate a test; they are
/// never driven by `*_tests` lists.
pub const STRUCTURAL_MARKERS: [&str; 6] = [
    "filterwarnings",
    "skipif",
    "parametrize",
    "usefixtures",
    "tryfirst",
    "trylast",
];

pub const ENV_MARKER_LINE: &str = "env(name): mark test to run only on named environment";

const BUILTIN_MARKER_LINES: [&str; 8] = [
    "filterwarnings(warning): add a warning filter to the given test.",
    "skip(reason=None): skip the given test function with an optional reason.",
    "skipif(condition, ..., *, reason=...): skip the given test function if any of the conditions evaluate to True.",
    "xfail(condition, ..., *, reason=..., run=True, raises=None, strict=xfail_strict): mark the test function as an expected failure.",
    "parametrize(argnames, argvalues): call a test function multiple times passing in different arguments in turn.",
    "usefixtures(fixturename1, fixturename2, ...): mark tests as using all fixtures specified.",
    "tryfirst: mark a hook implementation function such that the plugin machinery will try to call it first.",
    "trylast: mark a hook implementation function such that the plugin machinery will try to call it last.",
];

/// Name tag of a raised condition, e.g. `ZeroDivisionError`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionKind(String);

impl ExceptionKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for ExceptionKind {
    fn default() -> Self {
        Self::new(DEFAULT_EXCEPTION)
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exception kinds an expected failure accepts; raising any one of them
/// satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedExceptions(Vec<ExceptionKind>);

impl ExpectedExceptions {
    pub fn new<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = ExceptionKind>,
    {
        Self(kinds.into_iter().collect())
    }

    /// Kinds named by a configured value: a string, or an array of names.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::List(names) => Self::new(names.iter().map(|n| ExceptionKind::new(n.to_string()))),
            other => Self::new([ExceptionKind::new(other.to_string())]),
        }
    }

    pub fn kinds(&self) -> &[ExceptionKind] {
        &self.0
    }

    pub fn accepts(&self, kind: &ExceptionKind) -> bool {
        self.0.contains(kind)
    }
}

impl Default for ExpectedExceptions {
    fn default() -> Self {
        ExceptionKind::default().into()
    }
}

impl From<ExceptionKind> for ExpectedExceptions {
    fn from(kind: ExceptionKind) -> Self {
        Self(vec![kind])
    }
}

impl fmt::Display for ExpectedExceptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            kinds => {
                let names: Vec<&str> = kinds.iter().map(ExceptionKind::name).collect();
                write!(f, "({})", names.join(", "))
            }
        }
    }
}

/// Annotation category that a `{kind}_tests` list can drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerKind {
    Skip,
    Xfail,
    Custom(String),
}

impl MarkerKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "skip" => MarkerKind::Skip,
            "xfail" => MarkerKind::Xfail,
            other => MarkerKind::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MarkerKind::Skip => "skip",
            MarkerKind::Xfail => "xfail",
            MarkerKind::Custom(name) => name,
        }
    }

    /// Module variable holding the list of tests to mark with this kind.
    pub fn list_variable(&self) -> String {
        format!("{}_tests", self.name())
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mark attached to a collected item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mark", rename_all = "lowercase")]
pub enum Mark {
    Skip {
        reason: String,
    },
    Xfail {
        reason: String,
        strict: bool,
        /// `None` accepts any raised condition.
        raises: Option<ExpectedExceptions>,
    },
    Env {
        names: Vec<String>,
    },
    Custom {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Value>,
    },
}

impl Mark {
    pub fn skip(reason: impl Into<String>) -> Self {
        Mark::Skip {
            reason: reason.into(),
        }
    }

    /// Strict expected failure restricted to `raises`.
    pub fn xfail(reason: impl Into<String>, raises: impl Into<ExpectedExceptions>) -> Self {
        Mark::Xfail {
            reason: reason.into(),
            strict: true,
            raises: Some(raises.into()),
        }
    }

    pub fn env<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mark::Env {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Mark::Custom {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Build a mark from the name, positional and keyword arguments a host
    /// decorator carried.
    pub fn from_host(name: &str, args: &[Value], kwargs: &IndexMap<String, Value>) -> Self {
        let reason = || {
            kwargs
                .get("reason")
                .or_else(|| args.first())
                .map(Value::to_string)
        };
        match name {
            "env" => Mark::env(args.iter().map(Value::to_string)),
            "skip" => Mark::skip(reason().unwrap_or_else(|| "unconditional skip".into())),
            "xfail" => Mark::Xfail {
                reason: reason().unwrap_or_default(),
                strict: matches!(kwargs.get("strict"), Some(Value::Bool(true))),
                raises: kwargs.get("raises").map(ExpectedExceptions::from_value),
            },
            other => Mark::Custom {
                name: other.to_string(),
                args: args.to_vec(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Mark::Skip { .. } => "skip",
            Mark::Xfail { .. } => "xfail",
            Mark::Env { .. } => "env",
            Mark::Custom { name, .. } => name,
        }
    }
}

/// Extract the marker name from an ini-style `name(args): description` line.
pub fn marker_line_name(line: &str) -> &str {
    let head = line.split('(').next().unwrap_or(line);
    head.split(':').next().unwrap_or(head).trim()
}

/// Registered marker declarations, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    lines: Vec<String>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the host's built-in markers.
    pub fn with_builtins() -> Self {
        Self {
            lines: BUILTIN_MARKER_LINES.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn add_line(&mut self, line: impl Into<String>) -> Result<()> {
        let line = line.into();
        if marker_line_name(&line).is_empty() {
            return Err(BaselineError::InvalidArgument(format!(
                "marker declaration has no name: {line:?}"
            )));
        }
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn names(&self) -> IndexSet<&str> {
        self.lines.iter().map(|l| marker_line_name(l)).collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.names().contains(name)
    }

    /// Marker kinds eligible for list-driven marking.
    pub fn available_kinds(&self) -> Vec<MarkerKind> {
        self.names()
            .into_iter()
            .filter(|name| !STRUCTURAL_MARKERS.contains(name))
            .map(MarkerKind::from_name)
            .collect()
    }
}
