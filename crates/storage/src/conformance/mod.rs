//! Conformance test suite for `ProblemStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `ProblemStore` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Insert**: record creation, duplicate detection
//! - **Fetch**: lookup by business key, owned-copy isolation
//! - **Persist**: single-write replacement, visibility after persist
//! - **Error handling**: correct error variants for missing records
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use problemflow_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn postgres_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_postgres_store().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod error;
mod fetch;
mod insert;
mod persist;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use crate::record::{Field, ProblemRecord};
use crate::ProblemStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "insert", "fetch", "persist").
    pub category: String,
    /// Test name (e.g. "fetch_returns_inserted_record").
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

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(insert::run_insert_tests(&factory).await);
    results.extend(fetch::run_fetch_tests(&factory).await);
    results.extend(persist::run_persist_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn state_labels() -> BTreeMap<String, String> {
    [
        ("101", "New"),
        ("102", "Assigned"),
        ("103", "Root Cause Analysis"),
    ]
    .into_iter()
    .map(|(code, label)| (code.to_string(), label.to_string()))
    .collect()
}

/// A problem in state 102 with a handful of text fields.
fn make_problem(number: &str) -> ProblemRecord {
    ProblemRecord::new(number)
        .with_field("state", Field::choice(state_labels(), "102"))
        .with_field("problem_state", Field::choice(state_labels(), "102"))
        .with_field("short_description", Field::text("Email is slow"))
        .with_field("cause_notes", Field::text(""))
        .with_field("sys_id", Field::text(format!("sys-{}", number)).read_only())
}
