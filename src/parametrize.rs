//! Parametrization sourced from module variables.
//!
//! A registered [`ParametrizedVariable`] with root `name` binds the module
//! variable `name_data` to every test that requests the argument
//! `name_value`, producing one test instance per configured value.

use crate::error::{BaselineError, Result};
use crate::marks::Mark;
use crate::resolver::ConfigResolver;
use crate::scope::Scope;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

pub const NOT_CONFIGURED_ID: &str = "Not Configured";

/// Builds a display id from a parameter value.
pub type IdFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Descriptor registered before collection: `(root_name, skip_sentinel,
/// id_fn, indirect)`.
#[derive(Clone)]
pub struct ParametrizedVariable {
    root_name: String,
    skip_sentinel: Value,
    id_fn: Option<IdFn>,
    indirect: bool,
}

impl ParametrizedVariable {
    pub fn new(root_name: impl Into<String>, skip_sentinel: Value) -> Result<Self> {
        let root_name = root_name.into();
        if root_name.trim().is_empty() {
            return Err(BaselineError::InvalidArgument(
                "parametrized variable root name must not be empty".into(),
            ));
        }
        Ok(Self {
            root_name,
            skip_sentinel,
            id_fn: None,
            indirect: false,
        })
    }

    pub fn with_ids<F>(mut self, id_fn: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.id_fn = Some(Arc::new(id_fn));
        self
    }

    pub fn with_indirect(mut self, indirect: bool) -> Self {
        self.indirect = indirect;
        self
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn skip_sentinel(&self) -> &Value {
        &self.skip_sentinel
    }

    pub fn is_indirect(&self) -> bool {
        self.indirect
    }

    /// Module variable holding the values, `{root}_data`.
    pub fn data_variable(&self) -> String {
        format!("{}_data", self.root_name)
    }

    /// Test argument receiving one value, `{root}_value`.
    pub fn value_argname(&self) -> String {
        format!("{}_value", self.root_name)
    }
}

impl fmt::Debug for ParametrizedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParametrizedVariable")
            .field("root_name", &self.root_name)
            .field("skip_sentinel", &self.skip_sentinel)
            .field("id_fn", &self.id_fn.as_ref().map(|_| ".."))
            .field("indirect", &self.indirect)
            .finish()
    }
}

/// How instance ids are produced.
#[derive(Clone)]
pub enum ParamIds {
    /// The host's built-in derivation, see [`default_id`].
    Framework,
    Explicit(Vec<String>),
    Function(IdFn),
}

impl fmt::Debug for ParamIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamIds::Framework => f.write_str("Framework"),
            ParamIds::Explicit(ids) => f.debug_tuple("Explicit").field(ids).finish(),
            ParamIds::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// One entry of `argvalues`, optionally carrying marks.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    pub value: Value,
    pub marks: Vec<Mark>,
}

impl ParamSet {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            marks: Vec::new(),
        }
    }
}

/// Arguments handed to the host's parametrize call.
#[derive(Debug, Clone)]
pub struct ParametrizeSpec {
    pub argname: String,
    pub argvalues: Vec<ParamSet>,
    pub ids: ParamIds,
    pub indirect: bool,
}

/// A concrete test instance produced by a spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInstance {
    pub id: String,
    pub value: Value,
    pub marks: Vec<Mark>,
}

impl ParametrizeSpec {
    pub fn ids(&self) -> Vec<String> {
        let ids = match &self.ids {
            ParamIds::Explicit(ids) => ids.clone(),
            ParamIds::Function(id_fn) => self.argvalues.iter().map(|p| id_fn(&p.value)).collect(),
            ParamIds::Framework => self
                .argvalues
                .iter()
                .enumerate()
                .map(|(index, p)| default_id(&p.value, &self.argname, index))
                .collect(),
        };
        disambiguate(ids)
    }

    pub fn instances(&self) -> Vec<ParamInstance> {
        self.ids()
            .into_iter()
            .zip(&self.argvalues)
            .map(|(id, param)| ParamInstance {
                id,
                value: param.value.clone(),
                marks: param.marks.clone(),
            })
            .collect()
    }

    /// Placeholder standing in for a spec with no values, so the function
    /// is still collected and reported as skipped.
    pub fn empty_parameter_set(&self, function_name: &str) -> ParamInstance {
        ParamInstance {
            id: format!("{}0", self.argname),
            value: Value::None,
            marks: vec![Mark::skip(format!(
                "got empty parameter set ['{}'], function {function_name}",
                self.argname
            ))],
        }
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(&self.ids, ParamIds::Explicit(ids) if ids.len() == 1 && ids[0] == NOT_CONFIGURED_ID)
    }
}

/// The host's id for a value: scalars render as themselves, anything else
/// as `{argname}{index}`.
pub fn default_id(value: &Value, argname: &str, index: usize) -> String {
    match value {
        Value::Str(s) => ascii_escaped(s),
        Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) => value.to_string(),
        Value::List(_) | Value::Map(_) => format!("{argname}{index}"),
    }
}

/// Escape `s` the way the host renders string ids: printable ASCII is kept,
/// everything else becomes a backslash escape.
fn ascii_escaped(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            ' '..='~' => escaped.push(c),
            c if (c as u32) < 0x100 => escaped.push_str(&format!("\\x{:02x}", c as u32)),
            c if (c as u32) < 0x10000 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    escaped
}

/// Suffix duplicated ids with their position among duplicates.
fn disambiguate(ids: Vec<String>) -> Vec<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for id in &ids {
        *counts.entry(id.as_str()).or_default() += 1;
    }
    let duplicated: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    if duplicated.is_empty() {
        return ids;
    }

    let mut seen: IndexMap<String, usize> = IndexMap::new();
    ids.into_iter()
        .map(|id| {
            if duplicated.contains(&id) {
                let n = seen.entry(id.clone()).or_default();
                let unique = format!("{id}{n}");
                *n += 1;
                unique
            } else {
                id
            }
        })
        .collect()
}

/// The test function whose parametrization is being generated.
pub struct Metafunc<'a> {
    pub function_name: &'a str,
    pub fixturenames: &'a [String],
    pub scope: &'a dyn Scope,
}

impl Metafunc<'_> {
    pub fn requests(&self, argname: &str) -> bool {
        self.fixturenames.iter().any(|name| name == argname)
    }
}

/// Parametrize `metafunc` from the module variable described by
/// `descriptor`, or `None` when the function does not request it.
pub fn derive(
    descriptor: &ParametrizedVariable,
    metafunc: &Metafunc<'_>,
    resolver: &ConfigResolver<'_>,
) -> Option<ParametrizeSpec> {
    let argname = descriptor.value_argname();
    if !metafunc.requests(&argname) {
        return None;
    }

    let data_variable = descriptor.data_variable();
    let configured = resolver.resolve_or(
        metafunc.scope,
        &data_variable,
        descriptor.skip_sentinel.clone(),
    );

    if configured == descriptor.skip_sentinel {
        log::debug!(
            "`{data_variable}` not configured for {}, skipping",
            metafunc.function_name
        );
        return Some(ParametrizeSpec {
            argname,
            argvalues: vec![ParamSet {
                value: Value::List(Vec::new()),
                marks: vec![Mark::skip(format!(
                    "No Configured `{data_variable}` values"
                ))],
            }],
            ids: ParamIds::Explicit(vec![NOT_CONFIGURED_ID.to_string()]),
            indirect: descriptor.indirect,
        });
    }

    let values = match configured {
        Value::Str(_) => vec![configured],
        other => match other.iter_elements() {
            Some(elements) => elements,
            None => vec![other],
        },
    };

    Some(ParametrizeSpec {
        argname,
        argvalues: values.into_iter().map(ParamSet::new).collect(),
        ids: match &descriptor.id_fn {
            Some(id_fn) => ParamIds::Function(Arc::clone(id_fn)),
            None => ParamIds::Framework,
        },
        indirect: descriptor.indirect,
    })
}
