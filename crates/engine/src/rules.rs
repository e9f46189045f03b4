//! Static mandatory-field rules.
//!
//! Two tables: the fields a state first requires on entry, and the extra
//! fields each resolution code drags in.

use std::str::FromStr;

use serde::Serialize;

use crate::states::ProblemState;

pub const RESOLUTION_CODE_FIELD: &str = "resolution_code";

/// Fields first required upon entering `state`.
pub fn newly_required_fields(state: ProblemState) -> &'static [&'static str] {
    match state {
        ProblemState::New => &["short_description"],
        ProblemState::Assigned => &["assigned_to"],
        ProblemState::RootCauseAnalysis => &[],
        ProblemState::FixInProgress => &["fix_notes", "cause_notes"],
        ProblemState::Resolved => &[RESOLUTION_CODE_FIELD],
        ProblemState::Closed => &[],
    }
}

/// How a problem was resolved or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionCode {
    FixApplied,
    RiskAccepted,
    Canceled,
    Duplicate,
}

impl ResolutionCode {
    pub const ALL: [ResolutionCode; 4] = [
        ResolutionCode::FixApplied,
        ResolutionCode::RiskAccepted,
        ResolutionCode::Canceled,
        ResolutionCode::Duplicate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionCode::FixApplied => "fix_applied",
            ResolutionCode::RiskAccepted => "risk_accepted",
            ResolutionCode::Canceled => "canceled",
            ResolutionCode::Duplicate => "duplicate",
        }
    }

    /// Additional fields that must be present once this code is chosen.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            ResolutionCode::FixApplied => &["cause_notes", "fix_notes"],
            ResolutionCode::RiskAccepted => &["cause_notes", "close_notes"],
            ResolutionCode::Canceled => &["close_notes"],
            ResolutionCode::Duplicate => &["duplicate_of"],
        }
    }
}

/// Text that names no [`ResolutionCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resolution code {0}")]
pub struct UnknownResolutionCode(pub String);

impl FromStr for ResolutionCode {
    type Err = UnknownResolutionCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownResolutionCode(s.to_string()))
    }
}
