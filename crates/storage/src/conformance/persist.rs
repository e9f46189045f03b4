use std::future::Future;

use super::{make_problem, TestResult};
use crate::ProblemStore;

pub(super) async fn run_persist_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "persist",
            "persisted_changes_visible_to_fetch",
            persisted_changes_visible_to_fetch(factory).await,
        ),
        TestResult::from_result(
            "persist",
            "persist_returns_stored_record",
            persist_returns_stored_record(factory).await,
        ),
        TestResult::from_result(
            "persist",
            "persist_leaves_other_records_alone",
            persist_leaves_other_records_alone(factory).await,
        ),
    ]
}

async fn persisted_changes_visible_to_fetch<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let mut record = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    record.set_value("state", "103");
    record.set_value("problem_state", "103");
    record.set_value("cause_notes", "disk full");
    s.persist(record, "State transition")
        .await
        .map_err(|e| format!("persist failed: {}", e))?;

    let stored = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    let got = (
        stored.value("state"),
        stored.value("problem_state"),
        stored.value("cause_notes"),
    );
    if got != (Some("103"), Some("103"), Some("disk full")) {
        return Err(format!("persisted values not visible: {:?}", got));
    }
    Ok(())
}

async fn persist_returns_stored_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let mut record = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    record.set_value("short_description", "Email is down");
    let stored = s
        .persist(record, "edit")
        .await
        .map_err(|e| e.to_string())?;
    let fetched = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    if stored != fetched {
        return Err("persist result differs from subsequent fetch".to_string());
    }
    Ok(())
}

async fn persist_leaves_other_records_alone<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for number in ["PRB0000001", "PRB0000002"] {
        s.insert(make_problem(number))
            .await
            .map_err(|e| e.to_string())?;
    }

    let mut record = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    record.set_value("short_description", "changed");
    s.persist(record, "edit")
        .await
        .map_err(|e| e.to_string())?;

    let other = s
        .fetch_by_number("PRB0000002")
        .await
        .map_err(|e| e.to_string())?;
    match other.value("short_description") {
        Some("Email is slow") => Ok(()),
        v => Err(format!("unrelated record changed: {:?}", v)),
    }
}
