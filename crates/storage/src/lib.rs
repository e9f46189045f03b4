//! Record store abstraction for problem records.
//!
//! The transition engine only ever talks to a [`ProblemStore`]: fetch a
//! record by its business key, mutate the owned copy, and persist it back
//! with a single write. [`MemoryStore`] is the in-process implementation used
//! by the CLI and the test suites; the [`conformance`] module checks that any
//! backend behaves the same way.

pub mod conformance;
mod error;
mod memory;
mod record;
mod seed;
mod traits;

pub use error::StorageError;
pub use memory::{MemoryStore, ReferenceDirectory};
pub use record::{Field, FieldKind, ProblemRecord};
pub use seed::SeedFile;
pub use traits::ProblemStore;
