//! Collected test items as seen by the engine.

use crate::marks::Mark;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// The host's view of one collected test.
pub trait TestItem {
    /// Dotted name of the owning module; the grouping key.
    fn module_name(&self) -> &str;

    fn class_name(&self) -> Option<&str>;

    fn name(&self) -> &str;

    fn marks(&self) -> &[Mark];

    fn add_mark(&mut self, mark: Mark);

    /// `ClassName.name` for methods, `name` for plain functions.
    fn qualified_name(&self) -> String {
        match self.class_name() {
            Some(class_name) => format!("{}.{}", class_name, self.name()),
            None => self.name().to_string(),
        }
    }

    fn marks_named(&self, name: &str) -> Vec<&Mark> {
        self.marks().iter().filter(|m| m.name() == name).collect()
    }
}

/// A concrete collected test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedItem {
    pub nodeid: String,
    pub module: String,
    pub class_name: Option<String>,
    /// Function name, including a `[id]` suffix for parametrized instances.
    pub name: String,
    pub fixturenames: Vec<String>,
    pub doc: Option<String>,
    pub marks: Vec<Mark>,
    /// Values bound by parametrization, keyed by argument name.
    pub params: IndexMap<String, Value>,
}

impl CollectedItem {
    pub fn new(module: impl Into<String>, class_name: Option<&str>, name: impl Into<String>) -> Self {
        let module = module.into();
        let name = name.into();
        let nodeid = node_id(&module, class_name, &name);
        Self {
            nodeid,
            module,
            class_name: class_name.map(str::to_string),
            name,
            fixturenames: Vec::new(),
            doc: None,
            marks: Vec::new(),
            params: IndexMap::new(),
        }
    }

    pub fn with_fixtures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixturenames = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl TestItem for CollectedItem {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn marks(&self) -> &[Mark] {
        &self.marks
    }

    fn add_mark(&mut self, mark: Mark) {
        self.marks.push(mark);
    }
}

/// Host-style node id: `module::Class::name` or `module::name`.
pub fn node_id(module_path: &str, class_name: Option<&str>, name: &str) -> String {
    match class_name {
        Some(class_name) => format!("{module_path}::{class_name}::{name}"),
        None => format!("{module_path}::{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_for_function() {
        let item = CollectedItem::new("tests.test_api", None, "test_login");
        assert_eq!(item.qualified_name(), "test_login");
        assert_eq!(item.nodeid, "tests.test_api::test_login");
    }

    #[test]
    fn test_qualified_name_for_method() {
        let item = CollectedItem::new("tests.test_api", Some("TestUsers"), "test_create");
        assert_eq!(item.qualified_name(), "TestUsers.test_create");
        assert_eq!(item.nodeid, "tests.test_api::TestUsers::test_create");
    }

    #[test]
    fn test_marks_named() {
        let item = CollectedItem::new("m", None, "test_a")
            .with_mark(Mark::env(["dev"]))
            .with_mark(Mark::bare("slow"))
            .with_mark(Mark::env(["stage"]));
        assert_eq!(item.marks_named("env").len(), 2);
        assert_eq!(item.marks_named("slow").len(), 1);
        assert!(item.marks_named("skip").is_empty());
    }
}
