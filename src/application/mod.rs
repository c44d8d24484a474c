//! Application layer - Arbitration use cases
//!
//! This layer contains:
//! - Filter: the per-bot response predicate
//! - Arbitration: mention override and channel assignment
//! - Services: policy registry and host hooks
//! - Messaging: raw text parsing into incoming messages
//! - Errors: Application-specific errors

pub mod arbitration;
pub mod errors;
pub mod filter;
pub mod messaging;
pub mod services;
