//! Transition execution pipeline.
//!
//! A request moves through a fixed sequence of steps:
//! 1. Fetch the record by number
//! 2. Check access and the mirrored state fields
//! 3. Validate the requested transition
//! 4. Check mandatory fields
//! 5. Assign submitted fields
//! 6. Move both state fields to the new state
//! 7. Persist with a single write
//! 8. Render the stored record
//!
//! Any failure returns immediately. All mutation before step 7 happens on an
//! owned copy of the record, so a failed request leaves the store untouched.

use problemflow_storage::{ProblemRecord, ProblemStore};
use serde_json::{Map, Value};

use crate::assign::assign_fields;
use crate::error::TransitionError;
use crate::payload::SubmittedFields;
use crate::projector::{Projector, RenderOptions};
use crate::required::check_required_fields;
use crate::states::{validate_transition, ProblemState};

pub const STATE_FIELD: &str = "state";
pub const PROBLEM_STATE_FIELD: &str = "problem_state";

/// Change reason recorded with every write.
pub const CHANGE_REASON: &str = "State transition";

/// One transition request as handed over by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct TransitionRequest {
    pub problem_number: String,
    pub new_state: String,
    pub data: SubmittedFields,
    pub options: RenderOptions,
}

/// The record's authoritative state code.
///
/// `state` and `problem_state` are stored twice by platform convention; they
/// must agree before any transition is attempted.
pub fn current_state(record: &ProblemRecord) -> Result<String, TransitionError> {
    let state = record.value(STATE_FIELD).unwrap_or_default();
    let problem_state = record.value(PROBLEM_STATE_FIELD).unwrap_or_default();
    if state != problem_state {
        return Err(TransitionError::InconsistentRecord {
            number: record.number().to_string(),
            state: state.to_string(),
            problem_state: problem_state.to_string(),
        });
    }
    Ok(state.to_string())
}

/// Write `state` to both state fields in lockstep.
pub fn set_state(record: &mut ProblemRecord, state: ProblemState) {
    record.set_value(STATE_FIELD, state.code());
    record.set_value(PROBLEM_STATE_FIELD, state.code());
}

fn check_access(record: &ProblemRecord) -> Result<(), TransitionError> {
    if record.can_read() && record.can_write() {
        Ok(())
    } else {
        Err(TransitionError::PermissionDenied {
            number: record.number().to_string(),
        })
    }
}

/// Runs transition requests against an owned store.
pub struct TransitionExecutor<S> {
    store: S,
    projector: Projector,
}

impl<S: ProblemStore> TransitionExecutor<S> {
    pub fn new(store: S, projector: Projector) -> Self {
        Self { store, projector }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Execute `request` and render the persisted record.
    pub async fn execute(
        &self,
        request: &TransitionRequest,
    ) -> Result<Map<String, Value>, TransitionError> {
        handle_transition(&self.store, &self.projector, request).await
    }
}

/// Execute a transition against `store` and render the persisted record.
pub async fn handle_transition<S: ProblemStore>(
    store: &S,
    projector: &Projector,
    request: &TransitionRequest,
) -> Result<Map<String, Value>, TransitionError> {
    match apply_transition(store, request).await {
        Ok(record) => {
            tracing::info!(
                number = %request.problem_number,
                new_state = %request.new_state,
                "problem state transition committed"
            );
            Ok(projector.render(&record, &request.options))
        }
        Err(e) => {
            tracing::error!(
                number = %request.problem_number,
                new_state = %request.new_state,
                kind = ?e.kind(),
                "{}",
                e
            );
            Err(e)
        }
    }
}

/// Steps 1 to 7. Returns the record as stored.
async fn apply_transition<S: ProblemStore>(
    store: &S,
    request: &TransitionRequest,
) -> Result<ProblemRecord, TransitionError> {
    let mut record = store.fetch_by_number(&request.problem_number).await?;

    check_access(&record)?;
    let current = current_state(&record)?;

    let (from, to) = validate_transition(&current, &request.new_state)?;
    check_required_fields(from, to, &request.data, &record)?;

    let report = assign_fields(&mut record, &request.data);
    tracing::debug!(
        number = record.number(),
        applied = report.applied.len(),
        skipped = report.skipped_unknown.len(),
        "assigned submitted fields"
    );
    set_state(&mut record, to);

    let number = record.number().to_string();
    store
        .persist(record, CHANGE_REASON)
        .await
        .map_err(|source| TransitionError::PersistenceFailure { number, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use problemflow_storage::Field;

    #[test]
    fn mirrored_states_must_agree() {
        let record = ProblemRecord::new("PRB0040001")
            .with_field(STATE_FIELD, Field::text("102"))
            .with_field(PROBLEM_STATE_FIELD, Field::text("103"));
        assert!(matches!(
            current_state(&record),
            Err(TransitionError::InconsistentRecord { .. })
        ));
    }

    #[test]
    fn set_state_moves_both_fields() {
        let mut record = ProblemRecord::new("PRB0040001")
            .with_field(STATE_FIELD, Field::text("102"))
            .with_field(PROBLEM_STATE_FIELD, Field::text("102"));
        set_state(&mut record, ProblemState::RootCauseAnalysis);
        assert_eq!(current_state(&record).unwrap(), "103");
    }

    #[test]
    fn access_requires_read_and_write() {
        let record = ProblemRecord::new("PRB0040001").with_access(true, false);
        assert!(matches!(
            check_access(&record),
            Err(TransitionError::PermissionDenied { .. })
        ));
        assert!(check_access(&record.with_access(true, true)).is_ok());
    }
}
