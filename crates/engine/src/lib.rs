//! Problem state transition engine.
//!
//! Validates and executes a guarded state transition on a problem record:
//! the fixed state table ([`states`]), cumulative mandatory-field rules with
//! resolution-code expansion ([`rules`], [`required`]), lenient field
//! assignment ([`assign`]), the fetch-validate-persist pipeline
//! ([`executor`]), and response shaping ([`projector`]).
//!
//! The record store is a collaborator behind
//! [`ProblemStore`](problemflow_storage::ProblemStore); transport concerns
//! live in the CLI crate.

pub mod assign;
pub mod error;
pub mod executor;
pub mod payload;
pub mod projector;
pub mod required;
pub mod rules;
pub mod states;

pub use error::{ErrorKind, TransitionError};
pub use executor::{handle_transition, TransitionExecutor, TransitionRequest};
pub use payload::SubmittedFields;
pub use projector::{DisplayValueMode, Projector, RenderOptions};
pub use rules::{ResolutionCode, UnknownResolutionCode};
pub use states::{is_transition_allowed, is_valid_state, ProblemState};
