//! Conformance test suite for [`Store`] implementations.
//!
//! A backend-agnostic suite that any `Store` can run to check it honours the
//! contract the engine relies on:
//!
//! - **Insert**: new records start at version 0, duplicate ids are rejected
//! - **Version / CAS**: compare-and-set increments, stale versions conflict
//!   and a failed write mutates nothing
//! - **Listing**: every record is returned, ordered by instance id, and the
//!   remedy and mission collections are independent
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory that creates
//! a fresh, empty store for each test:
//!
//! ```ignore
//! use remedy_storage::conformance::run_conformance_suite;
//! use remedy_storage::MemoryStore;
//!
//! #[test]
//! fn memory_conformance() {
//!     let report = run_conformance_suite(MemoryStore::new);
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod insert;
mod list;
mod version;

use std::collections::BTreeMap;
use std::fmt;

use remedy_core::{ActiveMission, ActiveRemedy, MissionStatus, RemedyStatus};
use time::macros::datetime;

use crate::Store;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "insert", "version", "list").
    pub category: String,
    /// Test name (e.g. "insert_starts_at_version_0").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub fn run_conformance_suite<S, F>(factory: F) -> ConformanceReport
where
    S: Store,
    F: Fn() -> S,
{
    let mut results = Vec::new();

    results.extend(insert::run_insert_tests(&factory));
    results.extend(version::run_version_tests(&factory));
    results.extend(list::run_list_tests(&factory));

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

fn make_remedy(instance_id: &str, step_id: &str) -> ActiveRemedy {
    ActiveRemedy {
        instance_id: instance_id.to_string(),
        remedy_definition_id: "TEST-REMEDY".to_string(),
        current_step_id: step_id.to_string(),
        status: RemedyStatus::InProgress,
        deadline: None,
        history: Vec::new(),
        variables: BTreeMap::new(),
        started_at: datetime!(2025-01-01 00:00 UTC),
        closed_at: None,
        mission_instance_id: None,
        version: 0,
    }
}

fn make_mission(instance_id: &str, order: u32) -> ActiveMission {
    ActiveMission {
        instance_id: instance_id.to_string(),
        playbook_id: "TEST-PLAYBOOK".to_string(),
        status: MissionStatus::InProgress,
        current_step_order: order,
        active_remedy_instance_id: None,
        variables: BTreeMap::new(),
        remedy_instance_ids: Vec::new(),
        started_at: datetime!(2025-01-01 00:00 UTC),
        concluded_at: None,
        version: 0,
    }
}
