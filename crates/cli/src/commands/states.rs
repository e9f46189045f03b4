use problemflow_engine::rules::newly_required_fields;
use problemflow_engine::ProblemState;

use crate::OutputFormat;

/// The transition table as JSON, in state code order.
pub(crate) fn state_table() -> serde_json::Value {
    let states: Vec<serde_json::Value> = ProblemState::ALL
        .into_iter()
        .map(|state| {
            serde_json::json!({
                "code": state.code(),
                "label": state.label(),
                "allowed_next": state
                    .allowed_next()
                    .iter()
                    .map(|s| s.code())
                    .collect::<Vec<_>>(),
                "newly_required": newly_required_fields(state),
            })
        })
        .collect();
    serde_json::json!({ "states": states })
}

pub(crate) fn cmd_states(output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            println!("{}", state_table());
        }
        OutputFormat::Text => {
            for state in ProblemState::ALL {
                let next: Vec<&str> = state.allowed_next().iter().map(|s| s.code()).collect();
                let required = newly_required_fields(state);
                println!(
                    "{} {:<20} -> {:<12} requires: {}",
                    state.code(),
                    state.label(),
                    next.join(", "),
                    if required.is_empty() {
                        "-".to_string()
                    } else {
                        required.join(", ")
                    }
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_state_in_order() {
        let table = state_table();
        let codes: Vec<&str> = table["states"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, ["101", "102", "103", "104", "106", "107"]);
    }

    #[test]
    fn closed_only_reopens_to_root_cause_analysis() {
        let table = state_table();
        assert_eq!(table["states"][5]["allowed_next"], serde_json::json!(["103"]));
        assert_eq!(
            table["states"][3]["newly_required"],
            serde_json::json!(["fix_notes", "cause_notes"])
        );
    }
}
