//! How a test's final status follows from its marks.
//!
//! The host runs the test; these functions decide what the run means given
//! the skip, env and xfail marks the engine attached.

use crate::environment::Environment;
use crate::gate;
use crate::item::TestItem;
use crate::marks::{ExceptionKind, Mark};
use serde::Serialize;
use std::fmt;

/// What the test body did when called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Passed,
    Raised(ExceptionKind),
}

impl CallOutcome {
    pub fn raised(kind: &str) -> Self {
        CallOutcome::Raised(ExceptionKind::new(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
    XFailed { reason: String },
    XPassed { reason: String },
}

impl TestStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed { .. } => "FAILED",
            TestStatus::Skipped { .. } => "SKIPPED",
            TestStatus::XFailed { .. } => "XFAIL",
            TestStatus::XPassed { .. } => "XPASS",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => f.write_str(self.label()),
            TestStatus::Failed { reason }
            | TestStatus::Skipped { reason }
            | TestStatus::XFailed { reason }
            | TestStatus::XPassed { reason } => write!(f, "{} ({})", self.label(), reason),
        }
    }
}

/// Status decided before the test body runs, if any.
///
/// Skip marks take precedence over the environment gate.
pub fn setup_status<T: TestItem + ?Sized>(item: &T, env: &Environment) -> Option<TestStatus> {
    let skip_reason = item.marks().iter().find_map(|mark| match mark {
        Mark::Skip { reason } => Some(reason.clone()),
        _ => None,
    });
    if let Some(reason) = skip_reason {
        return Some(TestStatus::Skipped { reason });
    }
    gate::check(item, env)
        .err()
        .map(|skipped| TestStatus::Skipped {
            reason: skipped.reason,
        })
}

/// Status of a test whose body ran with `outcome`.
pub fn call_status(marks: &[Mark], outcome: &CallOutcome) -> TestStatus {
    let xfail = marks.iter().find_map(|mark| match mark {
        Mark::Xfail {
            reason,
            strict,
            raises,
        } => Some((reason, *strict, raises)),
        _ => None,
    });

    match (xfail, outcome) {
        (None, CallOutcome::Passed) => TestStatus::Passed,
        (None, CallOutcome::Raised(kind)) => TestStatus::Failed {
            reason: kind.to_string(),
        },
        (Some((reason, _, raises)), CallOutcome::Raised(kind)) => match raises {
            Some(expected) if !expected.accepts(kind) => TestStatus::Failed {
                reason: kind.to_string(),
            },
            _ => TestStatus::XFailed {
                reason: reason.clone(),
            },
        },
        (Some((reason, true, _)), CallOutcome::Passed) => TestStatus::Failed {
            reason: format!("[XPASS(strict)] {reason}"),
        },
        (Some((reason, false, _)), CallOutcome::Passed) => TestStatus::XPassed {
            reason: reason.clone(),
        },
    }
}

/// Process exit code for a set of final statuses.
pub fn exit_code<'a, I>(statuses: I) -> i32
where
    I: IntoIterator<Item = &'a TestStatus>,
{
    if statuses.into_iter().any(TestStatus::is_failure) {
        1
    } else {
        0
    }
}
