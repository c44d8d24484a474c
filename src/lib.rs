//! Response arbitration for several bots sharing one messaging host.
//!
//! Each attached bot is evaluated against its policy for every inbound
//! message, and the channel's assignee is updated so that exactly one bot
//! answers. An explicit mention of a bot always wins.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::arbitration::{Arbiter, Outcome, Precedence};
pub use application::filter::evaluate;
pub use domain::entities::{BotIdentity, BotPolicy, Channel, IncomingMessage};
