//! Application layer for Higia.
//!
//! Use cases sitting between the backend traits in `higia-core` and a front
//! end: authentication, identifying a sector, and running one cleaning
//! session from start to finalization.

pub mod auth_service;
pub mod home;
pub mod identification;
pub mod messages;
pub mod timer;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use auth_service::AuthService;
pub use home::HomeService;
pub use identification::{ChannelCapture, IdentificationService, TagCapture, TagRead};
pub use timer::ElapsedTicker;
pub use workflow::{SessionWorkflow, WorkflowState};
