//! Domain entities - Core objects the arbitration engine reasons about

pub mod identity;
pub mod policy;
pub mod message;
pub mod channel;

pub use identity::BotIdentity;
pub use policy::{BotPolicy, CommandFilter, FilterMode, KeywordFilter, ResponseMode, SourceFilter, SourceRule};
pub use message::{CommandParse, IncomingMessage};
pub use channel::Channel;
