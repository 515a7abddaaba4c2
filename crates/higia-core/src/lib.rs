//! Domain core for the Higia hygiene-tracking client.
//!
//! Holds the models the backend speaks in, the error taxonomy, and the
//! collaborator traits the application layer is written against.

pub mod auth;
pub mod capture;
pub mod cleaning;
pub mod clock;
pub mod config;
pub mod elapsed;
pub mod error;
pub mod sector;

// Re-export common error type
pub use error::{HigiaError, Result};
