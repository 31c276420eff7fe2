//! rbaseline: environment-aware test selection, mark reconciliation and
//! module-variable parametrization for a pytest-shaped host.

pub mod cli;
pub mod collection_integration;
pub mod config;
pub mod environment;
pub mod error;
pub mod fixtures;
pub mod gate;
pub mod hooks;
pub mod intent;
pub mod item;
pub mod manager;
pub mod manifest;
pub mod marks;
pub mod outcome;
pub mod parametrize;
pub mod reconcile;
pub mod report;
pub mod resolver;
pub mod scope;
pub mod value;

#[cfg(feature = "python")]
mod python;

pub use collection_integration::{
    build_manager, display_collection_results, plan_collection, CollectionPlan, PlanOptions,
    PlannedItem,
};
pub use config::{read_project_config, BaselineConfig, ProjectConfig};
pub use environment::{Environment, DEFAULT_ENV};
pub use error::{BaselineError, Result, Skipped};
pub use hooks::{BaselinePlugin, HookRegistry};
pub use item::{CollectedItem, TestItem};
pub use manager::BaselineManager;
pub use manifest::Manifest;
pub use marks::{ExpectedExceptions, Mark, MarkerKind};
pub use resolver::ConfigResolver;
pub use scope::{ModuleScope, Scope, ScopeProvider};
pub use value::Value;
