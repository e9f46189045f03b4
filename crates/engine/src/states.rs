//! Problem lifecycle states and the fixed transition table.
//!
//! The table is a static directed graph keyed by state code. A transition is
//! legal only if it is listed; self-loops are never implied.

use std::fmt;

use serde::Serialize;

use crate::error::TransitionError;

/// A known problem lifecycle state. Ordering follows the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProblemState {
    New,
    Assigned,
    RootCauseAnalysis,
    FixInProgress,
    Resolved,
    Closed,
}

impl ProblemState {
    /// Every state, in ascending code order.
    pub const ALL: [ProblemState; 6] = [
        ProblemState::New,
        ProblemState::Assigned,
        ProblemState::RootCauseAnalysis,
        ProblemState::FixInProgress,
        ProblemState::Resolved,
        ProblemState::Closed,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ProblemState::New => "101",
            ProblemState::Assigned => "102",
            ProblemState::RootCauseAnalysis => "103",
            ProblemState::FixInProgress => "104",
            ProblemState::Resolved => "106",
            ProblemState::Closed => "107",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProblemState::New => "New",
            ProblemState::Assigned => "Assigned",
            ProblemState::RootCauseAnalysis => "Root Cause Analysis",
            ProblemState::FixInProgress => "Fix in Progress",
            ProblemState::Resolved => "Resolved",
            ProblemState::Closed => "Closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// States directly reachable from `self`.
    pub fn allowed_next(self) -> &'static [ProblemState] {
        use ProblemState::*;
        match self {
            New => &[Assigned],
            Assigned => &[RootCauseAnalysis, Closed],
            RootCauseAnalysis => &[FixInProgress, Resolved, Closed],
            FixInProgress => &[RootCauseAnalysis, Resolved, Closed],
            Resolved => &[RootCauseAnalysis, Closed],
            Closed => &[RootCauseAnalysis],
        }
    }

    pub fn can_transition_to(self, to: ProblemState) -> bool {
        self.allowed_next().contains(&to)
    }
}

impl fmt::Display for ProblemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// True iff `code` is a key of the transition table.
pub fn is_valid_state(code: &str) -> bool {
    ProblemState::from_code(code).is_some()
}

/// True iff `to` is listed as a next state of `from`. Unknown codes on
/// either side are never allowed.
pub fn is_transition_allowed(from: &str, to: &str) -> bool {
    match (ProblemState::from_code(from), ProblemState::from_code(to)) {
        (Some(from), Some(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Check a requested move from the record's persisted state.
///
/// An unrecognized `current` means the stored record is corrupt and is a
/// server fault; an unknown or unreachable `requested` is the caller's error.
pub fn validate_transition(
    current: &str,
    requested: &str,
) -> Result<(ProblemState, ProblemState), TransitionError> {
    let from = ProblemState::from_code(current).ok_or_else(|| TransitionError::InvalidState {
        state: current.to_string(),
    })?;
    let to =
        ProblemState::from_code(requested).ok_or_else(|| TransitionError::UnknownTargetState {
            state: requested.to_string(),
        })?;
    if !from.can_transition_to(to) {
        return Err(TransitionError::TransitionNotAllowed {
            from: current.to_string(),
            to: requested.to_string(),
        });
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn valid_states_are_exactly_the_table_keys() {
        for code in ["101", "102", "103", "104", "106", "107"] {
            assert!(is_valid_state(code), "{code} should be valid");
        }
        for code in ["100", "105", "108", "", "new", "1010"] {
            assert!(!is_valid_state(code), "{code} should be invalid");
        }
    }

    #[test]
    fn allowed_transitions_match_table() {
        let expected: &[(&str, &[&str])] = &[
            ("101", &["102"]),
            ("102", &["103", "107"]),
            ("103", &["104", "106", "107"]),
            ("104", &["103", "106", "107"]),
            ("106", &["103", "107"]),
            ("107", &["103"]),
        ];
        for (from, targets) in expected {
            for to in ProblemState::ALL {
                assert_eq!(
                    is_transition_allowed(from, to.code()),
                    targets.contains(&to.code()),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn self_loops_are_not_implied() {
        for state in ProblemState::ALL {
            assert!(!state.can_transition_to(state), "{state} -> {state}");
        }
    }

    #[test]
    fn ordering_follows_code() {
        let mut codes: Vec<&str> = ProblemState::ALL.iter().map(|s| s.code()).collect();
        codes.sort();
        let ordered: Vec<&str> = ProblemState::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, ordered);
        assert!(ProblemState::Resolved < ProblemState::Closed);
    }

    #[test]
    fn corrupt_current_state_is_server_fault() {
        let err = validate_transition("999", "102").unwrap_err();
        assert!(matches!(err, TransitionError::InvalidState { ref state } if state == "999"));
        assert_eq!(err.kind(), ErrorKind::ServerFault);
    }

    #[test]
    fn unknown_or_unreachable_target_is_bad_request() {
        let unknown = validate_transition("102", "105").unwrap_err();
        assert!(matches!(unknown, TransitionError::UnknownTargetState { .. }));
        assert_eq!(unknown.kind(), ErrorKind::BadRequest);

        let unreachable = validate_transition("101", "106").unwrap_err();
        assert!(matches!(unreachable, TransitionError::TransitionNotAllowed { .. }));
        assert_eq!(unreachable.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn listed_transition_validates() {
        let (from, to) = validate_transition("102", "103").unwrap();
        assert_eq!(from, ProblemState::Assigned);
        assert_eq!(to, ProblemState::RootCauseAnalysis);
    }
}
