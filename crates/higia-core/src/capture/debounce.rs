use std::time::{Duration, Instant};

/// Identical reads closer together than this are one tap.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Collapses bursts of identical reads into one.
///
/// A camera keeps reporting the same QR code for as long as it is in frame,
/// and NFC stacks can fire twice for one tap. A read is accepted when its code
/// differs from the last accepted one or the window has passed since then.
#[derive(Debug, Clone)]
pub struct ReadDebouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl ReadDebouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `true` if `code` read at `at` should be emitted.
    pub fn accept(&mut self, code: &str, at: Instant) -> bool {
        if let Some((last_code, last_at)) = &self.last {
            if last_code == code && at.saturating_duration_since(*last_at) < self.window {
                return false;
            }
        }
        self.last = Some((code.to_string(), at));
        true
    }

    /// Forgets the last accepted read so the same code can be emitted again
    /// immediately (used when the user explicitly asks to re-scan).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for ReadDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
