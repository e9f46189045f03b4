use std::future::Future;

use super::{make_problem, TestResult};
use crate::ProblemStore;

pub(super) async fn run_fetch_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "fetch",
            "fetch_returns_inserted_record",
            fetch_returns_inserted_record(factory).await,
        ),
        TestResult::from_result(
            "fetch",
            "fetch_preserves_field_metadata",
            fetch_preserves_field_metadata(factory).await,
        ),
        TestResult::from_result(
            "fetch",
            "fetched_copy_mutation_is_invisible",
            fetched_copy_mutation_is_invisible(factory).await,
        ),
    ]
}

async fn fetch_returns_inserted_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let record = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    if record.number() != "PRB0000001" {
        return Err(format!("wrong record returned: {}", record.number()));
    }
    if record.value("number") != Some("PRB0000001") {
        return Err("number field does not mirror the business key".to_string());
    }
    Ok(())
}

async fn fetch_preserves_field_metadata<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let record = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    let state = record.field("state").ok_or("state field missing")?;
    if state.display_value() != "Assigned" {
        return Err(format!("state label lost: {}", state.display_value()));
    }
    let sys_id = record.field("sys_id").ok_or("sys_id field missing")?;
    if sys_id.is_writable() {
        return Err("sys_id lost its read-only flag".to_string());
    }
    Ok(())
}

async fn fetched_copy_mutation_is_invisible<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProblemStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(make_problem("PRB0000001"))
        .await
        .map_err(|e| e.to_string())?;

    let mut copy = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    copy.set_value("state", "103");
    drop(copy);

    let again = s
        .fetch_by_number("PRB0000001")
        .await
        .map_err(|e| e.to_string())?;
    match again.value("state") {
        Some("102") => Ok(()),
        other => Err(format!("unpersisted change leaked: {:?}", other)),
    }
}
