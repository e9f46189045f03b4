//! Mandatory field resolution.
//!
//! Requirements are cumulative: entering a state demands every field that
//! any earlier state (in code order) demanded, re-checked against current
//! data. Choosing a resolution code extends the set while it is being
//! checked, so the check runs off an explicit work stack.

use problemflow_storage::ProblemRecord;

use crate::error::TransitionError;
use crate::payload::{submitted_text, SubmittedFields};
use crate::rules::{newly_required_fields, ResolutionCode, RESOLUTION_CODE_FIELD};
use crate::states::ProblemState;

/// Where a required value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Record,
    Submitted,
}

/// Lookup priority: the stored value wins over the submitted one.
const LOOKUP_ORDER: [ValueSource; 2] = [ValueSource::Record, ValueSource::Submitted];

/// The state whose cumulative rules apply to a move into `new`.
///
/// Closing introduces no descriptive fields of its own, so it reuses the
/// current state's rules.
fn accumulation_target(current: ProblemState, new: ProblemState) -> ProblemState {
    if new == ProblemState::Closed {
        current
    } else {
        new
    }
}

/// Required fields for `current -> new` before resolution-code expansion.
///
/// Walks the states in ascending order up to and including the
/// accumulation target. Closing always adds `resolution_code`.
pub fn accumulated_required_fields(
    current: ProblemState,
    new: ProblemState,
) -> Vec<&'static str> {
    let target = accumulation_target(current, new);
    let mut fields = Vec::new();
    for state in ProblemState::ALL {
        fields.extend_from_slice(newly_required_fields(state));
        if state == target {
            break;
        }
    }
    if new == ProblemState::Closed {
        fields.push(RESOLUTION_CODE_FIELD);
    }
    fields
}

/// Resolve `field` from the record, falling back to the submitted payload.
/// Nil values on either side do not count.
pub fn resolve_value(
    field: &str,
    record: &ProblemRecord,
    submitted: &SubmittedFields,
) -> Option<(ValueSource, String)> {
    LOOKUP_ORDER.into_iter().find_map(|source| {
        let value = match source {
            ValueSource::Record => record
                .field(field)
                .filter(|f| !f.is_nil())
                .map(|f| f.value().to_string()),
            ValueSource::Submitted => submitted.get(field).and_then(submitted_text),
        };
        value.map(|v| (source, v))
    })
}

/// Resolution codes whose extra fields must be present.
///
/// The stored code satisfies presence, but a different submitted code is
/// what assignment will write, so it is expanded as well.
fn chosen_resolution_codes(
    source: ValueSource,
    resolved: String,
    submitted: &SubmittedFields,
) -> Vec<String> {
    let incoming = match source {
        ValueSource::Record => submitted
            .get(RESOLUTION_CODE_FIELD)
            .and_then(submitted_text)
            .filter(|code| *code != resolved),
        ValueSource::Submitted => None,
    };
    std::iter::once(resolved).chain(incoming).collect()
}

/// Verify that every field required for `current -> new` is present.
///
/// Reports the first missing field, or the first invalid resolution code.
pub fn check_required_fields(
    current: ProblemState,
    new: ProblemState,
    submitted: &SubmittedFields,
    record: &ProblemRecord,
) -> Result<(), TransitionError> {
    let mut pending = accumulated_required_fields(current, new);

    while let Some(field) = pending.pop() {
        let (source, value) = resolve_value(field, record, submitted).ok_or_else(|| {
            TransitionError::MissingRequiredField {
                field: field.to_string(),
            }
        })?;
        tracing::trace!(field, ?source, "required field present");

        if field == RESOLUTION_CODE_FIELD {
            for code in chosen_resolution_codes(source, value, submitted) {
                let code = code.parse::<ResolutionCode>().map_err(|e| {
                    TransitionError::InvalidResolutionCode { value: e.0 }
                })?;
                pending.extend_from_slice(code.required_fields());
            }
        }
    }

    Ok(())
}
