//! Domain layer - Core arbitration model with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Bot identities, policies, incoming messages, channel records
//! - Traits: Abstractions the engine consumes (policy lookup, trace sink)

pub mod entities;
pub mod traits;
