//! Cleaning session ("higienização") domain module.
//!
//! # Module Structure
//!
//! - `model`: the session record as returned by the backend (`CleaningSession`)
//! - `backend`: the backend operations the workflow depends on (`CleaningBackend`)

mod backend;
mod model;

pub use backend::CleaningBackend;
pub use model::CleaningSession;
