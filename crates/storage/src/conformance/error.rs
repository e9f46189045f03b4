use std::future::Future;

use super::{make_problem, TestResult};
use crate::{ProblemStore, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "error",
            "fetch_nonexistent_returns_not_found",
            fetch_nonexistent_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "persist_nonexistent_returns_not_found",
            persist_nonexistent_returns_not_found(factory).await,
        ),
        TestResult::from_result(
            "error",
            "list_numbers_empty_store",
            list_numbers_empty_store(factory).await,
        ),
    ]
}

async fn fetch_nonexistent_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.fetch_by_number("PRB9999999").await {
        Err(StorageError::NotFound { number }) if number == "PRB9999999" => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

async fn persist_nonexistent_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.persist(make_problem("PRB9999999"), "edit").await {
        Err(StorageError::NotFound { .. }) => {}
        other => return Err(format!("expected NotFound, got {:?}", other)),
    }
    match s.fetch_by_number("PRB9999999").await {
        Err(StorageError::NotFound { .. }) => Ok(()),
        other => Err(format!("persist must not create records, got {:?}", other)),
    }
}

async fn list_numbers_empty_store<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let numbers = s.list_numbers().await.map_err(|e| e.to_string())?;
    if numbers.is_empty() {
        Ok(())
    } else {
        Err(format!("expected empty store, got {:?}", numbers))
    }
}
