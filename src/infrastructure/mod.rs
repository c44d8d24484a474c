//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: YAML configuration loading
//! - Trace: Decision trace sinks
//! - Host: In-memory host with channels and bot sessions
//! - Replay: Event replay from JSON-lines input

pub mod config;
pub mod host;
pub mod replay;
pub mod trace;
