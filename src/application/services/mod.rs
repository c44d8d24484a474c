//! Application services - Policy registry and host event handling

pub mod controller_service;

pub use controller_service::{ControllerService, PolicySet, ReadySummary};
