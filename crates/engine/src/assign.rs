//! Field assignment from the submitted payload onto the record.
//!
//! Assignment never fails. Unknown fields are skipped and writes to fields
//! the caller may not write are performed anyway; both are only logged.

use problemflow_storage::ProblemRecord;

use crate::payload::{submitted_text, SubmittedFields};

const NUMBER_FIELD: &str = "number";

/// What [`assign_fields`] did with each submitted field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    /// Fields written to the record.
    pub applied: Vec<String>,
    /// Submitted names the record has no field for.
    pub skipped_unknown: Vec<String>,
    /// Submitted fields with a nil value, left untouched.
    pub skipped_nil: Vec<String>,
    /// Fields written despite being marked not writable.
    pub unwritable_overrides: Vec<String>,
}

/// Apply every non-nil submitted value onto `record`.
///
/// The business key is never reassigned.
pub fn assign_fields(record: &mut ProblemRecord, submitted: &SubmittedFields) -> AssignmentReport {
    let mut report = AssignmentReport::default();

    for (name, raw) in submitted {
        let Some(field) = record.field(name) else {
            tracing::warn!(field = %name, number = record.number(), "invalid problem field, ignoring");
            report.skipped_unknown.push(name.clone());
            continue;
        };

        let Some(value) = submitted_text(raw) else {
            report.skipped_nil.push(name.clone());
            continue;
        };

        if name == NUMBER_FIELD {
            if value != record.number() {
                tracing::warn!(number = record.number(), attempted = %value, "problem number is immutable, ignoring");
            }
            continue;
        }

        if !field.is_writable() {
            tracing::warn!(field = %name, number = record.number(), "cannot write to field, writing anyway");
            report.unwritable_overrides.push(name.clone());
        }

        record.set_value(name, value);
        report.applied.push(name.clone());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use problemflow_storage::Field;
    use serde_json::json;

    fn problem() -> ProblemRecord {
        ProblemRecord::new("PRB0040001")
            .with_field("short_description", Field::text("Email slow"))
            .with_field("fix_notes", Field::text("old notes"))
            .with_field("assigned_to", Field::reference("sys_user", "abc123"))
            .with_field("sys_id", Field::text("f00").read_only())
    }

    fn submitted(value: serde_json::Value) -> SubmittedFields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn writes_known_fields() {
        let mut record = problem();
        let report = assign_fields(
            &mut record,
            &submitted(json!({"fix_notes": "rebooted", "assigned_to": "def456"})),
        );
        assert_eq!(record.value("fix_notes"), Some("rebooted"));
        assert_eq!(record.value("assigned_to"), Some("def456"));
        assert_eq!(report.applied, ["assigned_to", "fix_notes"]);
    }

    #[test]
    fn unknown_fields_are_skipped_without_error() {
        let mut record = problem();
        let before = record.clone();
        let report = assign_fields(&mut record, &submitted(json!({"favourite_colour": "teal"})));
        assert_eq!(record, before);
        assert_eq!(report.skipped_unknown, ["favourite_colour"]);
        assert!(!record.has_field("favourite_colour"));
    }

    #[test]
    fn nil_values_never_clear_existing() {
        let mut record = problem();
        let report = assign_fields(
            &mut record,
            &submitted(json!({"fix_notes": "", "short_description": null})),
        );
        assert_eq!(record.value("fix_notes"), Some("old notes"));
        assert_eq!(record.value("short_description"), Some("Email slow"));
        assert!(report.applied.is_empty());
        assert_eq!(report.skipped_nil.len(), 2);
    }

    #[test]
    fn unwritable_field_is_still_written() {
        let mut record = problem();
        let report = assign_fields(&mut record, &submitted(json!({"sys_id": "b4r"})));
        assert_eq!(record.value("sys_id"), Some("b4r"));
        assert_eq!(report.unwritable_overrides, ["sys_id"]);
    }

    #[test]
    fn number_is_immutable() {
        let mut record = problem();
        assign_fields(&mut record, &submitted(json!({"number": "PRB9999999"})));
        assert_eq!(record.value("number"), Some("PRB0040001"));
        assert_eq!(record.number(), "PRB0040001");
    }
}
