//! Integration between a host's collected inventory and the engine.
//!
//! A pass runs the same phases a host would drive: generate tests for every
//! function, expand parametrized instances, reconcile mark lists and decide
//! which items the setup phase will skip.

use crate::config::{BaselineConfig, ProjectConfig};
use crate::environment::Environment;
use crate::error::Result;
use crate::hooks::{HookRegistry, StaticPlugin};
use crate::item::CollectedItem;
use crate::manager::BaselineManager;
use crate::manifest::{FunctionEntry, Manifest, ModuleEntry};
use crate::outcome::{exit_code, setup_status, TestStatus};
use crate::parametrize::{Metafunc, ParamInstance, ParametrizeSpec};
use indexmap::IndexMap;
use serde::Serialize;

const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Run-level inputs that do not come from the manifest.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub env: Environment,
    pub htmlpath: Option<String>,
    pub invocation_args: Vec<String>,
}

/// One item after the pass, with the status setup will give it, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedItem {
    #[serde(flatten)]
    pub item: CollectedItem,
    pub setup: Option<TestStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionPlan {
    pub env: String,
    pub header: Vec<String>,
    pub metadata: IndexMap<String, String>,
    pub items: Vec<PlannedItem>,
    pub warnings: Vec<String>,
}

impl CollectionPlan {
    /// Drift warnings and setup skips never fail a run.
    pub fn exit_code(&self) -> i32 {
        exit_code(self.items.iter().filter_map(|planned| planned.setup.as_ref()))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PlannedItem> {
        self.items
            .iter()
            .filter(|planned| matches!(planned.setup, Some(TestStatus::Skipped { .. })))
    }
}

/// Build the manager for a run from project settings and the manifest.
///
/// Descriptors and the logo from settings are registered after any plugin
/// already in `hooks`.
pub fn build_manager(
    options: PlanOptions,
    project: &ProjectConfig,
    manifest: &Manifest,
    hooks: &mut HookRegistry,
) -> Result<BaselineManager> {
    let mut config = BaselineConfig::new(options.env)
        .with_invocation_args(options.invocation_args);
    if let Some(htmlpath) = options.htmlpath.or_else(|| project.settings.htmlpath.clone()) {
        config = config.with_htmlpath(htmlpath);
    }
    for line in project.markers.iter().chain(&manifest.markers) {
        config.add_marker_line(line.as_str())?;
    }

    let parametrized_variables = project
        .settings
        .parametrized_variables
        .iter()
        .chain(&manifest.parametrized_variables)
        .map(|setting| setting.to_descriptor())
        .collect::<Result<Vec<_>>>()?;
    hooks.register(StaticPlugin {
        logo: project.settings.logo.clone(),
        parametrized_variables,
    });

    BaselineManager::new(config, hooks)
}

/// Items for `function`: one per combination of parametrized instances, or
/// the bare function when nothing parametrizes it.
fn expand_function(
    module: &ModuleEntry,
    function: &FunctionEntry,
    specs: &[ParametrizeSpec],
) -> Vec<CollectedItem> {
    if specs.is_empty() {
        return vec![module.item(function)];
    }

    let mut combinations: Vec<Vec<(&str, ParamInstance)>> = vec![Vec::new()];
    for spec in specs {
        let mut instances = spec.instances();
        if instances.is_empty() {
            instances.push(spec.empty_parameter_set(&function.name));
        }
        combinations = combinations
            .into_iter()
            .flat_map(|combination| {
                instances.iter().map(move |instance| {
                    let mut next = combination.clone();
                    next.push((spec.argname.as_str(), instance.clone()));
                    next
                })
            })
            .collect();
    }

    combinations
        .into_iter()
        .map(|combination| {
            let ids: Vec<&str> = combination.iter().map(|(_, i)| i.id.as_str()).collect();
            let name = format!("{}[{}]", function.name, ids.join("-"));
            let mut item = module.named_item(function, &name);
            for (argname, instance) in combination {
                item.params.insert(argname.to_string(), instance.value);
                item.marks.extend(instance.marks);
            }
            item
        })
        .collect()
}

/// Run one collection pass over `manifest`.
pub fn plan_collection(manifest: &Manifest, manager: &BaselineManager) -> CollectionPlan {
    let scopes = manifest.scopes();

    let mut items = Vec::new();
    for module in &manifest.modules {
        let scope = module.scope();
        for function in &module.functions {
            let specs = manager.generate_tests(&Metafunc {
                function_name: &function.name,
                fixturenames: &function.fixtures,
                scope: &scope,
            });
            items.extend(expand_function(module, function, &specs));
        }
    }

    let reconciliation = manager.collection_modifyitems(&mut items, &scopes);

    let items = items
        .into_iter()
        .map(|item| {
            let setup = setup_status(&item, manager.env());
            PlannedItem { item, setup }
        })
        .collect();

    CollectionPlan {
        env: manager.env().name().to_string(),
        header: manager.report_header(),
        metadata: manager.config().metadata.clone(),
        items,
        warnings: reconciliation
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}

/// Display collection results in a format similar to pytest
pub fn display_collection_results(plan: &CollectionPlan) {
    for line in &plan.header {
        println!("{line}");
    }

    if plan.items.is_empty() {
        println!("No tests collected.");
    } else {
        let mut summary_parts = vec![format!("collected {}", plural(plan.items.len(), "item"))];
        let skipped = plan.skipped().count();
        if skipped > 0 {
            summary_parts.push(format!("{skipped} skipped"));
        }
        if !plan.warnings.is_empty() {
            summary_parts.push(plural(plan.warnings.len(), "warning"));
        }
        println!("{}", summary_parts.join(" / "));

        println!();
        for planned in &plan.items {
            match &planned.setup {
                Some(status) => println!("  {} {status}", planned.item.nodeid),
                None => println!("  {}", planned.item.nodeid),
            }
        }
    }

    if !plan.warnings.is_empty() {
        println!();
        println!(
            "=============================== warnings summary ==============================="
        );
        for warning in &plan.warnings {
            println!("{YELLOW}{warning}{RESET}");
        }
    }
}
