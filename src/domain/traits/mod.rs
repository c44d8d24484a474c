//! Domain traits - Abstractions for collaborators the engine consumes

pub mod policy_store;
pub mod trace;

pub use policy_store::PolicyStore;
pub use trace::{TraceEvent, TraceSink};
