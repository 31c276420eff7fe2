//! Skipping tests that are restricted to other environments.

use crate::environment::Environment;
use crate::error::Skipped;
use crate::item::TestItem;
use crate::marks::Mark;

/// Environment names allowed by the item's `env` marks, in declaration order.
pub fn allowed_environments<T: TestItem + ?Sized>(item: &T) -> Vec<&str> {
    item.marks_named("env")
        .into_iter()
        .filter_map(|mark| match mark {
            Mark::Env { names } => Some(names),
            _ => None,
        })
        .flatten()
        .map(String::as_str)
        .collect()
}

/// Setup-time check: skip when the item declares environments and the active
/// one is not among them.
pub fn check<T: TestItem + ?Sized>(item: &T, env: &Environment) -> Result<(), Skipped> {
    let allowed = allowed_environments(item);
    if allowed.is_empty() || allowed.iter().any(|name| env.is(name)) {
        return Ok(());
    }
    let listed: Vec<String> = allowed.iter().map(|name| format!("'{name}'")).collect();
    Err(Skipped::new(format!(
        "test requires env in [{}]",
        listed.join(", ")
    )))
}
