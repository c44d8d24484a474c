//! Assignment arbitration - decides which bot owns a channel for a message

pub mod arbiter;
pub mod mentions;

pub use arbiter::{Arbiter, Outcome, Precedence};
pub use mentions::{mention_targets, mentioned_bots};
