//! `TokenStore` implementations.
//!
//! Both keep the same fixed-key layout (`@token`, `@user` as JSON text), so a
//! file written by one build can be read by the next.

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
