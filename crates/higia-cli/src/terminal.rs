//! Terminal-backed capture sources.

use async_trait::async_trait;
use higia_core::Result;
use higia_core::capture::{
    CaptureOutcome, DEFAULT_DEBOUNCE_WINDOW, IdentificationCapture, ReadDebouncer, normalize_code,
};
use std::io::Write;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented stdin, shared by code capture and notes entry.
pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    debouncer: ReadDebouncer,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            debouncer: ReadDebouncer::new(DEFAULT_DEBOUNCE_WINDOW),
        }
    }

    /// Next line, or `None` at end of input.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    pub fn prompt(&self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one sector code per line, as typed or sent by a keyboard-wedge
/// reader. An empty line or end of input cancels.
#[async_trait]
impl IdentificationCapture for Terminal {
    async fn capture(&mut self) -> Result<CaptureOutcome> {
        loop {
            self.prompt("Código do setor (vazio para cancelar): ");
            let Some(line) = self.read_line().await? else {
                return Ok(CaptureOutcome::Cancelled);
            };
            if line.trim().is_empty() {
                return Ok(CaptureOutcome::Cancelled);
            }
            let code = normalize_code(&line)?;
            if self.debouncer.accept(&code, Instant::now()) {
                return Ok(CaptureOutcome::Code(code));
            }
        }
    }
}

/// Yields the code given on the command line once, then cancels.
pub struct ArgCapture(Option<String>);

impl ArgCapture {
    pub fn new(code: &str) -> Self {
        Self(Some(code.to_string()))
    }
}

#[async_trait]
impl IdentificationCapture for ArgCapture {
    async fn capture(&mut self) -> Result<CaptureOutcome> {
        match self.0.take() {
            Some(raw) => Ok(CaptureOutcome::Code(normalize_code(&raw)?)),
            None => Ok(CaptureOutcome::Cancelled),
        }
    }
}
