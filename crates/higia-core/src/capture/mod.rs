//! Sector identification capture (QR scan / NFC read).
//!
//! Hardware drivers live outside this workspace; this module defines what a
//! capture produces and the helpers capture implementations share.

mod debounce;
mod ndef;

pub use debounce::{DEFAULT_DEBOUNCE_WINDOW, ReadDebouncer};
pub use ndef::decode_text_payload;

use async_trait::async_trait;

use crate::error::{HigiaError, Result};

pub const EMPTY_TAG_MESSAGE: &str = "Tag NFC vazia ou inválida";

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A sector code was read.
    Code(String),
    /// The user backed out before anything was read.
    Cancelled,
}

/// A source of sector codes.
///
/// Each call yields exactly one code, or `Cancelled`. Implementations collapse
/// repeated reads of one physical tap into a single code and release any
/// hardware they hold when dropped.
#[async_trait]
pub trait IdentificationCapture: Send {
    async fn capture(&mut self) -> Result<CaptureOutcome>;
}

/// Trims a raw read into a sector code, rejecting blank reads.
pub fn normalize_code(raw: &str) -> Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(HigiaError::validation(EMPTY_TAG_MESSAGE));
    }
    Ok(code.to_string())
}
