//! Report enrichment: test descriptions and fixture-derived extras.
//!
//! Fixture values reach the engine as type-erased `Any` values. A
//! [`FixtureExtra`] selects fixtures of one concrete type (optionally looking
//! inside map-valued fixtures) and turns each into a [`ReportExtra`] artifact
//! for the HTML report.

use indexmap::IndexMap;
use serde::Serialize;
use std::any::Any;
use std::fmt::{self, Write as _};
use std::sync::Arc;

pub const NO_DESCRIPTION: &str = "No Description";

pub type FixtureValue = Arc<dyn Any + Send + Sync>;

/// A map-valued fixture whose entries are searched when `search_dict` is set.
pub type FixtureMap = IndexMap<String, FixtureValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFormat {
    Html,
    Image,
    Json,
    Text,
    Url,
    Video,
}

impl ExtraFormat {
    fn defaults(self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            ExtraFormat::Html | ExtraFormat::Url => (None, None),
            ExtraFormat::Image => (Some("image/png"), Some("png")),
            ExtraFormat::Json => (Some("application/json"), Some("json")),
            ExtraFormat::Text => (Some("text/plain"), Some("txt")),
            ExtraFormat::Video => (Some("video/mp4"), Some("mp4")),
        }
    }
}

/// One artifact attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportExtra {
    pub name: String,
    pub format_type: ExtraFormat,
    pub content: String,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
}

impl ReportExtra {
    pub fn new(format_type: ExtraFormat, content: impl Into<String>, name: impl Into<String>) -> Self {
        let (mime_type, extension) = format_type.defaults();
        Self {
            name: name.into(),
            format_type,
            content: content.into(),
            mime_type: mime_type.map(str::to_string),
            extension: extension.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

/// The per-phase report object the host hands over for enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub nodeid: String,
    pub when: Phase,
    pub description: Option<String>,
    pub extras: Vec<ReportExtra>,
}

impl TestReport {
    pub fn new(nodeid: impl Into<String>, when: Phase) -> Self {
        Self {
            nodeid: nodeid.into(),
            when,
            description: None,
            extras: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureScope {
    Function,
    Class,
    Module,
    Package,
    Session,
    Unknown,
}

impl fmt::Display for FixtureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixtureScope::Function => "function",
            FixtureScope::Class => "class",
            FixtureScope::Module => "module",
            FixtureScope::Package => "package",
            FixtureScope::Session => "session",
            FixtureScope::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A fixture argument of the running test.
#[derive(Clone)]
pub struct FixtureArg {
    pub name: String,
    pub scope: FixtureScope,
    pub value: FixtureValue,
}

impl FixtureArg {
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>, scope: FixtureScope, value: T) -> Self {
        Self {
            name: name.into(),
            scope,
            value: Arc::new(value),
        }
    }
}

impl fmt::Debug for FixtureArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureArg")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A fixture value found by [`fixtures_of_type`].
pub struct FoundFixture<'a> {
    /// Name of the fixture argument the value came from.
    pub fixture_name: &'a str,
    pub scope: FixtureScope,
    /// `fixture` for the fixture itself, `key(fixture)` for map entries.
    pub full_name: String,
    pub value: &'a (dyn Any + Send + Sync),
}

/// What a custom print function produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printout {
    pub content: String,
    /// Artifact name; defaults to the fixture's full name.
    pub name: Option<String>,
}

impl From<String> for Printout {
    fn from(content: String) -> Self {
        Self {
            content,
            name: None,
        }
    }
}

/// Context passed to a custom print function.
pub struct PrintContext<'a> {
    pub fixture: &'a FoundFixture<'a>,
    pub nodeid: &'a str,
    pub phase: Phase,
}

pub type FilterFn = Arc<dyn Fn(&FoundFixture<'_>) -> bool + Send + Sync>;
pub type PrintFn = Arc<dyn Fn(&PrintContext<'_>) -> Printout + Send + Sync>;
type DisplayFn = fn(&(dyn Any + Send + Sync), &mut String) -> fmt::Result;
type MatchFn = fn(&(dyn Any + Send + Sync)) -> bool;

fn is_type<T: Any>(value: &(dyn Any + Send + Sync)) -> bool {
    value.is::<T>()
}

fn display_as<T: Any + fmt::Display>(value: &(dyn Any + Send + Sync), out: &mut String) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => write!(out, "{value}"),
        None => Err(fmt::Error),
    }
}

/// Which fixtures to include on the report, and how to render them.
#[derive(Clone)]
pub struct FixtureExtra {
    is_match: MatchFn,
    type_name: &'static str,
    display: DisplayFn,
    search_dict: bool,
    filter_fn: Option<FilterFn>,
    print_fn: Option<PrintFn>,
    format: ExtraFormat,
}

impl FixtureExtra {
    /// Report every fixture of type `T`, rendered through its `Display`.
    pub fn of<T: Any + fmt::Display>() -> Self {
        Self {
            is_match: is_type::<T>,
            type_name: std::any::type_name::<T>(),
            display: display_as::<T>,
            search_dict: false,
            filter_fn: None,
            print_fn: None,
            format: ExtraFormat::Text,
        }
    }

    /// Also look at the entries of map-valued fixtures.
    pub fn search_dict(mut self, search_dict: bool) -> Self {
        self.search_dict = search_dict;
        self
    }

    pub fn with_filter<F>(mut self, filter_fn: F) -> Self
    where
        F: Fn(&FoundFixture<'_>) -> bool + Send + Sync + 'static,
    {
        self.filter_fn = Some(Arc::new(filter_fn));
        self
    }

    pub fn with_printer<F>(mut self, print_fn: F) -> Self
    where
        F: Fn(&PrintContext<'_>) -> Printout + Send + Sync + 'static,
    {
        self.print_fn = Some(Arc::new(print_fn));
        self
    }

    pub fn with_format(mut self, format: ExtraFormat) -> Self {
        self.format = format;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn matches(&self, value: &(dyn Any + Send + Sync)) -> bool {
        (self.is_match)(value)
    }

    /// The configured filter, or `true` when none is set.
    pub fn filter_check(&self, fixture: &FoundFixture<'_>) -> bool {
        self.filter_fn.as_ref().map_or(true, |filter| filter(fixture))
    }

    pub fn generate_printout(&self, fixture: &FoundFixture<'_>, nodeid: &str, phase: Phase) -> ReportExtra {
        let printout = match &self.print_fn {
            Some(print_fn) => print_fn(&PrintContext {
                fixture,
                nodeid,
                phase,
            }),
            None => {
                let mut content = String::new();
                match (self.display)(fixture.value, &mut content) {
                    Ok(()) => Printout::from(content),
                    Err(_) => Printout::from(format!(
                        "Encountered an error attempting to generate string representation \
                         for {} (type: {}), consider using a custom print function when \
                         registering fixtures to add to the report.",
                        fixture.full_name, self.type_name
                    )),
                }
            }
        };
        let name = printout.name.unwrap_or_else(|| fixture.full_name.clone());
        ReportExtra::new(self.format, printout.content, name)
    }
}

impl fmt::Debug for FixtureExtra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureExtra")
            .field("type_name", &self.type_name)
            .field("search_dict", &self.search_dict)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Fixtures to include on the report, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FixtureExtraList {
    extras: Vec<FixtureExtra>,
}

impl FixtureExtraList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, extra: FixtureExtra) {
        self.extras.push(extra);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FixtureExtra> {
        self.extras.iter()
    }

    pub fn len(&self) -> usize {
        self.extras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extras.is_empty()
    }
}

impl<'a> IntoIterator for &'a FixtureExtraList {
    type Item = &'a FixtureExtra;
    type IntoIter = std::slice::Iter<'a, FixtureExtra>;

    fn into_iter(self) -> Self::IntoIter {
        self.extras.iter()
    }
}

/// Fixture values among `funcargs` that `extra` selects by type.
pub fn fixtures_of_type<'a>(funcargs: &'a [FixtureArg], extra: &FixtureExtra) -> Vec<FoundFixture<'a>> {
    let mut found = Vec::new();
    for arg in funcargs {
        let value: &(dyn Any + Send + Sync) = arg.value.as_ref();
        if extra.matches(value) {
            found.push(FoundFixture {
                fixture_name: &arg.name,
                scope: arg.scope,
                full_name: arg.name.clone(),
                value,
            });
        }
        if !extra.search_dict {
            continue;
        }
        if let Some(map) = value.downcast_ref::<FixtureMap>() {
            for (key, entry) in map {
                let entry: &(dyn Any + Send + Sync) = entry.as_ref();
                if extra.matches(entry) {
                    found.push(FoundFixture {
                        fixture_name: &arg.name,
                        scope: arg.scope,
                        full_name: format!("{key}({})", arg.name),
                        value: entry,
                    });
                }
            }
        }
    }
    found
}

/// Set the description and append fixture extras to `report`.
///
/// Extras are only produced for the `call` phase; existing extras are kept.
pub fn enrich_report(
    report: &mut TestReport,
    doc: Option<&str>,
    funcargs: &[FixtureArg],
    extras: &FixtureExtraList,
) {
    report.description = Some(doc.unwrap_or(NO_DESCRIPTION).to_string());
    if report.when != Phase::Call {
        return;
    }
    for extra in extras {
        for fixture in fixtures_of_type(funcargs, extra) {
            if extra.filter_check(&fixture) {
                let printout = extra.generate_printout(&fixture, &report.nodeid, report.when);
                report.extras.push(printout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Credentials {
        user: String,
    }

    impl fmt::Display for Credentials {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Credentials({})", self.user)
        }
    }

    struct Unprintable;

    impl fmt::Display for Unprintable {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn funcargs() -> Vec<FixtureArg> {
        let mut accounts = FixtureMap::new();
        accounts.insert(
            "admin".to_string(),
            Arc::new(Credentials {
                user: "root".into(),
            }) as FixtureValue,
        );
        accounts.insert("count".to_string(), Arc::new(3i64) as FixtureValue);
        vec![
            FixtureArg::new(
                "creds",
                FixtureScope::Session,
                Credentials {
                    user: "alice".into(),
                },
            ),
            FixtureArg::new("accounts", FixtureScope::Module, accounts),
            FixtureArg::new("env", FixtureScope::Session, "dev".to_string()),
        ]
    }

    #[test]
    fn test_fixtures_of_type_direct_only() {
        let funcargs = funcargs();
        let extra = FixtureExtra::of::<Credentials>();
        let found = fixtures_of_type(&funcargs, &extra);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "creds");
        assert_eq!(found[0].scope, FixtureScope::Session);
    }

    #[test]
    fn test_fixtures_of_type_searches_maps() {
        let funcargs = funcargs();
        let extra = FixtureExtra::of::<Credentials>().search_dict(true);
        let names: Vec<String> = fixtures_of_type(&funcargs, &extra)
            .into_iter()
            .map(|f| f.full_name)
            .collect();
        assert_eq!(names, vec!["creds", "admin(accounts)"]);
    }

    #[test]
    fn test_enrich_report_on_call_phase() {
        let mut extras = FixtureExtraList::new();
        extras.add(FixtureExtra::of::<Credentials>().search_dict(true));
        let mut report = TestReport::new("m::test_a", Phase::Call);
        report.extras.push(ReportExtra::new(ExtraFormat::Url, "http://x", "link"));

        enrich_report(&mut report, Some("Logs in."), &funcargs(), &extras);

        assert_eq!(report.description.as_deref(), Some("Logs in."));
        assert_eq!(report.extras.len(), 3);
        assert_eq!(report.extras[1].content, "Credentials(alice)");
        assert_eq!(report.extras[1].name, "creds");
        assert_eq!(report.extras[1].mime_type.as_deref(), Some("text/plain"));
        assert_eq!(report.extras[2].name, "admin(accounts)");
    }

    #[test]
    fn test_enrich_report_setup_phase_sets_description_only() {
        let mut extras = FixtureExtraList::new();
        extras.add(FixtureExtra::of::<Credentials>());
        let mut report = TestReport::new("m::test_a", Phase::Setup);

        enrich_report(&mut report, None, &funcargs(), &extras);

        assert_eq!(report.description.as_deref(), Some("No Description"));
        assert!(report.extras.is_empty());
    }

    #[test]
    fn test_filter_and_printer() {
        let extra = FixtureExtra::of::<Credentials>()
            .search_dict(true)
            .with_filter(|f| f.full_name != "creds")
            .with_printer(|ctx| Printout {
                content: format!("{} @ {}", ctx.fixture.full_name, ctx.nodeid),
                name: Some("login".into()),
            })
            .with_format(ExtraFormat::Html);
        let mut extras = FixtureExtraList::new();
        extras.add(extra);
        let mut report = TestReport::new("m::test_a", Phase::Call);

        enrich_report(&mut report, None, &funcargs(), &extras);

        assert_eq!(
            report.extras,
            vec![ReportExtra::new(
                ExtraFormat::Html,
                "admin(accounts) @ m::test_a",
                "login"
            )]
        );
    }

    #[test]
    fn test_display_failure_falls_back() {
        let funcargs = vec![FixtureArg::new("broken", FixtureScope::Function, Unprintable)];
        let extra = FixtureExtra::of::<Unprintable>();
        let found = fixtures_of_type(&funcargs, &extra);
        let printout = extra.generate_printout(&found[0], "m::test_a", Phase::Call);
        assert!(printout
            .content
            .starts_with("Encountered an error attempting to generate string representation for broken"));
    }
}
