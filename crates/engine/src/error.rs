//! Transition failures and their transport-independent classification.

use problemflow_storage::StorageError;
use serde::Serialize;

/// Transport-independent classification of a transition failure.
///
/// The HTTP adapter owns the mapping to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NotAcceptable,
    Conflict,
    BadRequest,
    ServerFault,
}

/// Every way a transition request can fail. The pipeline stops at the first.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("no problem with number {number} exists")]
    NotFound { number: String },

    #[error("cannot read or write problem {number}")]
    PermissionDenied { number: String },

    /// `state` and `problem_state` disagree on the stored record.
    #[error("cannot determine the current state of problem {number} (state {state}, problem_state {problem_state})")]
    InconsistentRecord {
        number: String,
        state: String,
        problem_state: String,
    },

    /// The stored state is not in the transition table.
    #[error("current state {state} is not a valid state")]
    InvalidState { state: String },

    #[error("given new state {state} is not a valid state")]
    UnknownTargetState { state: String },

    #[error("problem state transition from state {from} to {to} is not possible")]
    TransitionNotAllowed { from: String, to: String },

    #[error("missing field {field}")]
    MissingRequiredField { field: String },

    #[error("resolution_code is set to {value}, which is not a valid value")]
    InvalidResolutionCode { value: String },

    #[error("cannot update problem record number {number}")]
    PersistenceFailure {
        number: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Storage(StorageError),
}

impl ErrorKind {
    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotAcceptable => "not_acceptable",
            ErrorKind::Conflict => "conflict",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::ServerFault => "server_fault",
        }
    }
}

impl TransitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransitionError::NotFound { .. } => ErrorKind::NotFound,
            TransitionError::PermissionDenied { .. } => ErrorKind::NotAcceptable,
            TransitionError::InconsistentRecord { .. } => ErrorKind::Conflict,
            TransitionError::InvalidState { .. } | TransitionError::Storage(_) => {
                ErrorKind::ServerFault
            }
            TransitionError::UnknownTargetState { .. }
            | TransitionError::TransitionNotAllowed { .. }
            | TransitionError::MissingRequiredField { .. }
            | TransitionError::InvalidResolutionCode { .. }
            | TransitionError::PersistenceFailure { .. } => ErrorKind::BadRequest,
        }
    }
}

impl From<StorageError> for TransitionError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { number } => TransitionError::NotFound { number },
            other => TransitionError::Storage(other),
        }
    }
}
