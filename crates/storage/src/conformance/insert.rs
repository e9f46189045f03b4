use std::future::Future;

use super::{make_problem, TestResult};
use crate::{ProblemStore, StorageError};

pub(super) async fn run_insert_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "insert",
            "insert_then_list_numbers",
            insert_then_list_numbers(factory).await,
        ),
        TestResult::from_result(
            "insert",
            "duplicate_insert_returns_already_exists",
            duplicate_insert_returns_already_exists(factory).await,
        ),
        TestResult::from_result(
            "insert",
            "duplicate_insert_keeps_original",
            duplicate_insert_keeps_original(factory).await,
        ),
    ]
}

async fn insert_then_list_numbers<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for number in ["PRB0000002", "PRB0000001"] {
        s.insert(make_problem(number))
            .await
            .map_err(|e| format!("insert {} failed: {}", number, e))?;
    }
    let numbers = s.list_numbers().await.map_err(|e| e.to_string())?;
    if numbers != ["PRB0000001", "PRB0000002"] {
        return Err(format!("expected sorted numbers, got {:?}", numbers));
    }
    Ok(())
}

async fn duplicate_insert_returns_already_exists<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert(make_problem("PRB0000001")).await {
        Err(StorageError::AlreadyExists { number }) if number == "PRB0000001" => Ok(()),
        other => Err(format!("expected AlreadyExists, got {:?}", other)),
    }
}

async fn duplicate_insert_keeps_original<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let mut other = make_problem("PRB0000001");
    other.set_value("short_description", "overwritten");
    let _ = s.insert(other).await;

    let stored = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    match stored.value("short_description") {
        Some("Email is slow") => Ok(()),
        other => Err(format!("original record was replaced: {:?}", other)),
    }
}
