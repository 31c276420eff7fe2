//! Applying `{kind}_tests` lists to the collected inventory.
//!
//! Items are grouped by module. For each module and each marker kind the
//! module's `{kind}_tests` list is read, matching items are marked, and
//! every configured and matched target is recorded in a ledger. Once all
//! modules have been processed, configured targets that matched nothing are
//! reported as one warning per marker kind.

use crate::intent::{extract_intents, MarkIntent, DEFAULT_REASON};
use crate::item::TestItem;
use crate::marks::{Mark, MarkerKind};
use crate::resolver::ConfigResolver;
use crate::scope::{EmptyScope, Scope, ScopeProvider};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fmt;

/// Configured versus matched targets for one marker kind.
///
/// Names are module-qualified: `module.test_name` or
/// `module.ClassName.test_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    pub configured: BTreeSet<String>,
    pub matched: BTreeSet<String>,
}

impl LedgerEntry {
    /// Configured targets that were never matched, sorted.
    pub fn orphaned(&self) -> Vec<String> {
        self.configured.difference(&self.matched).cloned().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationLedger {
    entries: IndexMap<MarkerKind, LedgerEntry>,
}

impl ReconciliationLedger {
    fn for_kinds(kinds: &[MarkerKind]) -> Self {
        Self {
            entries: kinds
                .iter()
                .map(|kind| (kind.clone(), LedgerEntry::default()))
                .collect(),
        }
    }

    pub fn entry(&self, kind: &MarkerKind) -> Option<&LedgerEntry> {
        self.entries.get(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MarkerKind, &LedgerEntry)> {
        self.entries.iter()
    }

    fn entry_mut(&mut self, kind: &MarkerKind) -> &mut LedgerEntry {
        self.entries.entry(kind.clone()).or_default()
    }
}

/// Configured targets of one marker kind that matched no collected test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDriftWarning {
    pub kind: MarkerKind,
    pub orphaned: Vec<String>,
}

impl fmt::Display for MarkDriftWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configured to be marked with '{}' does not match the tests actually marked, \
             check that test names and classes are spelled correctly: \n{}",
            self.kind,
            self.orphaned.join(", ")
        )
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub ledger: ReconciliationLedger,
    pub warnings: Vec<MarkDriftWarning>,
}

/// Item indices bucketed by module, in first-seen order.
pub fn group_by_module<T: TestItem>(items: &[T]) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (index, item) in items.iter().enumerate() {
        groups
            .entry(item.module_name().to_string())
            .or_default()
            .push(index);
    }
    groups
}

fn mark_for(kind: &MarkerKind, intent: &MarkIntent) -> Mark {
    match kind {
        MarkerKind::Skip => Mark::skip(intent.reason.clone()),
        MarkerKind::Xfail => Mark::xfail(intent.reason.clone(), intent.expected_exceptions()),
        MarkerKind::Custom(name) => Mark::bare(name.clone()),
    }
}

/// Mark `items` from their modules' `{kind}_tests` lists.
///
/// Drift never fails the pass; it is returned as warnings and logged.
pub fn reconcile<T, P>(
    items: &mut [T],
    scopes: &P,
    kinds: &[MarkerKind],
    resolver: &ConfigResolver<'_>,
) -> Reconciliation
where
    T: TestItem,
    P: ScopeProvider + ?Sized,
{
    let mut ledger = ReconciliationLedger::for_kinds(kinds);

    for (module_name, indices) in group_by_module(items) {
        let empty = EmptyScope { name: &module_name };
        let scope: &dyn Scope = scopes.module_scope(&module_name).unwrap_or(&empty);

        for kind in kinds {
            let intents = extract_intents(resolver, scope, &kind.list_variable(), DEFAULT_REASON);
            let entry = ledger.entry_mut(kind);
            entry
                .configured
                .extend(intents.keys().map(|target| format!("{module_name}.{target}")));

            for &index in &indices {
                let item = &mut items[index];
                let item_name = item.qualified_name();
                if let Some(intent) = intents.get(&item_name) {
                    debug!("marking {module_name}.{item_name} with '{kind}'");
                    item.add_mark(mark_for(kind, intent));
                    entry.matched.insert(format!("{module_name}.{item_name}"));
                }
            }
        }
    }

    let warnings: Vec<MarkDriftWarning> = ledger
        .iter()
        .filter_map(|(kind, entry)| {
            let orphaned = entry.orphaned();
            (!orphaned.is_empty()).then(|| MarkDriftWarning {
                kind: kind.clone(),
                orphaned,
            })
        })
        .collect();

    for warning in &warnings {
        warn!("{warning}");
    }

    Reconciliation { ledger, warnings }
}
