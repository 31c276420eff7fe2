//! The per-run plugin object.
//!
//! `BaselineManager` is built once after options are parsed. It gathers
//! hook contributions up front and then serves each phase of the run:
//! generate-tests, collection modify-items, runtest setup and make-report.

use crate::config::BaselineConfig;
use crate::environment::Environment;
use crate::error::{Result, Skipped};
use crate::gate;
use crate::hooks::HookRegistry;
use crate::item::TestItem;
use crate::parametrize::{derive, Metafunc, ParametrizeSpec, ParametrizedVariable};
use crate::reconcile::{reconcile, Reconciliation};
use crate::report::{enrich_report, FixtureArg, FixtureExtraList, TestReport};
use crate::resolver::ConfigResolver;
use crate::scope::ScopeProvider;
use chrono::Local;

#[derive(Debug)]
pub struct BaselineManager {
    config: BaselineConfig,
    logo: String,
    parametrized_module_variable_info: Vec<ParametrizedVariable>,
    fixtures_extra_config: FixtureExtraList,
}

impl BaselineManager {
    /// Collect hook contributions and configure the run.
    pub fn new(mut config: BaselineConfig, hooks: &HookRegistry) -> Result<Self> {
        config.configure(Local::now())?;
        Ok(Self {
            config,
            logo: hooks.client_logo(),
            parametrized_module_variable_info: hooks.parametrized_module_variable_info(),
            fixtures_extra_config: hooks.fixtures_add_to_report(),
        })
    }

    pub fn env(&self) -> &Environment {
        &self.config.env
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    pub fn parametrized_variables(&self) -> &[ParametrizedVariable] {
        &self.parametrized_module_variable_info
    }

    /// Header lines: the logo followed by a blank line, or nothing.
    pub fn report_header(&self) -> Vec<String> {
        if self.logo.is_empty() {
            return Vec::new();
        }
        vec![self.logo.clone(), String::new()]
    }

    /// Parametrize calls for `metafunc`, one per matching descriptor.
    pub fn generate_tests(&self, metafunc: &Metafunc<'_>) -> Vec<ParametrizeSpec> {
        let resolver = ConfigResolver::new(&self.config.env);
        self.parametrized_module_variable_info
            .iter()
            .filter_map(|descriptor| derive(descriptor, metafunc, &resolver))
            .collect()
    }

    /// Apply `{kind}_tests` lists after collection.
    pub fn collection_modifyitems<T, P>(&self, items: &mut [T], scopes: &P) -> Reconciliation
    where
        T: TestItem,
        P: ScopeProvider + ?Sized,
    {
        let kinds = self.config.markers.available_kinds();
        reconcile(items, scopes, &kinds, &ConfigResolver::new(&self.config.env))
    }

    pub fn runtest_setup<T: TestItem + ?Sized>(&self, item: &T) -> std::result::Result<(), Skipped> {
        gate::check(item, &self.config.env)
    }

    /// Attach the description and fixture extras when an HTML report is
    /// being written.
    pub fn runtest_makereport(&self, report: &mut TestReport, doc: Option<&str>, funcargs: &[FixtureArg]) {
        if self.config.has_html() {
            enrich_report(report, doc, funcargs, &self.fixtures_extra_config);
        }
    }
}
