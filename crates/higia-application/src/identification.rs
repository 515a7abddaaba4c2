//! Turning a captured sector code into a session workflow.
//!
//! Two entry flows exist. The tag flow ([`TagCapture`]) looks the sector up
//! and hands back a workflow waiting for an explicit start; the scanner flow
//! looks up and starts right away. Either way a failure is reported and the caller can
//! capture again.

use async_trait::async_trait;
use higia_core::capture::{
    CaptureOutcome, DEFAULT_DEBOUNCE_WINDOW, IdentificationCapture, ReadDebouncer,
    decode_text_payload, normalize_code,
};
use higia_core::cleaning::CleaningBackend;
use higia_core::clock::Clock;
use higia_core::{HigiaError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::messages;
use crate::workflow::SessionWorkflow;

#[derive(Clone)]
pub struct IdentificationService {
    backend: Arc<dyn CleaningBackend>,
    clock: Arc<dyn Clock>,
}

impl IdentificationService {
    pub fn new(backend: Arc<dyn CleaningBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Captures one code and looks its sector up.
    ///
    /// Returns `None` when the capture was cancelled. The workflow is `Absent`;
    /// the caller starts it once the user confirms. Lookup failures use
    /// `messages::LOOKUP_FAILED` as fallback.
    pub async fn identify(
        &self,
        capture: &mut dyn IdentificationCapture,
    ) -> Result<Option<SessionWorkflow>> {
        let code = match capture.capture().await? {
            CaptureOutcome::Code(code) => code,
            CaptureOutcome::Cancelled => {
                tracing::debug!("Identification cancelled");
                return Ok(None);
            }
        };

        let sector = self.backend.find_sector_by_code(&code).await.map_err(|err| {
            tracing::warn!(code = %code, error = %err, "Sector lookup failed");
            err
        })?;
        tracing::debug!(code = %code, sector_id = %sector.id, "Sector identified");

        SessionWorkflow::for_sector(self.backend.clone(), self.clock.clone(), sector).map(Some)
    }

    /// Captures, looks up and starts in one go.
    ///
    /// On success the workflow is already `Active`.
    pub async fn scan_and_start(
        &self,
        capture: &mut dyn IdentificationCapture,
    ) -> Result<Option<SessionWorkflow>> {
        let Some(mut workflow) = self.identify(capture).await? else {
            return Ok(None);
        };
        workflow.start().await?;
        Ok(Some(workflow))
    }
}

/// Capture fed by raw reads arriving on a channel.
///
/// Whatever produces reads (a terminal, a device bridge) sends them in;
/// repeated reads of one tap are dropped here. A closed channel counts as a
/// cancellation.
pub struct ChannelCapture {
    reads: mpsc::Receiver<String>,
    debouncer: ReadDebouncer,
}

impl ChannelCapture {
    pub fn new(reads: mpsc::Receiver<String>) -> Self {
        Self::with_window(reads, DEFAULT_DEBOUNCE_WINDOW)
    }

    pub fn with_window(reads: mpsc::Receiver<String>, window: Duration) -> Self {
        Self {
            reads,
            debouncer: ReadDebouncer::new(window),
        }
    }
}

#[async_trait]
impl IdentificationCapture for ChannelCapture {
    async fn capture(&mut self) -> Result<CaptureOutcome> {
        loop {
            let Some(raw) = self.reads.recv().await else {
                return Ok(CaptureOutcome::Cancelled);
            };
            let code = normalize_code(&raw).inspect_err(|_| self.debouncer.reset())?;
            if self.debouncer.accept(&code, Instant::now()) {
                return Ok(CaptureOutcome::Code(code));
            }
            tracing::trace!(code = %code, "Duplicate read ignored");
        }
    }
}

/// One tap as reported by an NFC reader bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRead {
    /// Payload of the tag's first NDEF text record.
    Payload(Vec<u8>),
    /// The reader failed before a record could be read.
    Failed(String),
}

/// Capture fed by NFC taps.
///
/// Payloads are decoded as NDEF text records and debounced like
/// [`ChannelCapture`] reads. After any failed tap the same tag may be read
/// again at once.
pub struct TagCapture {
    reads: mpsc::Receiver<TagRead>,
    debouncer: ReadDebouncer,
}

impl TagCapture {
    pub fn new(reads: mpsc::Receiver<TagRead>) -> Self {
        Self {
            reads,
            debouncer: ReadDebouncer::new(DEFAULT_DEBOUNCE_WINDOW),
        }
    }
}

#[async_trait]
impl IdentificationCapture for TagCapture {
    async fn capture(&mut self) -> Result<CaptureOutcome> {
        loop {
            let payload = match self.reads.recv().await {
                None => return Ok(CaptureOutcome::Cancelled),
                Some(TagRead::Payload(payload)) => payload,
                Some(TagRead::Failed(reason)) => {
                    tracing::warn!(reason = %reason, "NFC read failed");
                    self.debouncer.reset();
                    return Err(HigiaError::validation(messages::NFC_READ_FAILED));
                }
            };

            let code = decode_text_payload(&payload)
                .and_then(|text| normalize_code(&text))
                .inspect_err(|_| self.debouncer.reset())?;
            if self.debouncer.accept(&code, Instant::now()) {
                return Ok(CaptureOutcome::Code(code));
            }
            tracing::trace!(code = %code, "Duplicate tap ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockBackend, t0};
    use crate::workflow::WorkflowState;
    use higia_core::capture::EMPTY_TAG_MESSAGE;
    use higia_core::clock::ManualClock;

    struct Scripted(Vec<Result<CaptureOutcome>>);

    #[async_trait]
    impl IdentificationCapture for Scripted {
        async fn capture(&mut self) -> Result<CaptureOutcome> {
            if self.0.is_empty() {
                Ok(CaptureOutcome::Cancelled)
            } else {
                self.0.remove(0)
            }
        }
    }

    fn service() -> (Arc<MockBackend>, IdentificationService) {
        let backend = Arc::new(MockBackend::new());
        let clock = Arc::new(ManualClock::new(t0()));
        (backend.clone(), IdentificationService::new(backend, clock))
    }

    #[tokio::test]
    async fn test_identify_returns_absent_workflow() {
        let (backend, service) = service();
        let mut capture = Scripted(vec![Ok(CaptureOutcome::Code("SETOR-7".into()))]);

        let workflow = service.identify(&mut capture).await.unwrap().unwrap();

        assert_eq!(workflow.state(), &WorkflowState::Absent);
        assert_eq!(workflow.sector_code(), "SETOR-7");
        assert_eq!(workflow.title(), Some("Centro Cirúrgico"));
        assert_eq!(backend.calls(), vec![Call::FindSector("SETOR-7".into())]);
    }

    #[tokio::test]
    async fn test_cancelled_capture_contacts_nobody() {
        let (backend, service) = service();
        let mut capture = Scripted(vec![Ok(CaptureOutcome::Cancelled)]);

        assert!(service.identify(&mut capture).await.unwrap().is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_capture_error_is_reported() {
        let (backend, service) = service();
        let mut capture = Scripted(vec![Err(HigiaError::validation(EMPTY_TAG_MESSAGE))]);

        let err = service.identify(&mut capture).await.unwrap_err();
        assert_eq!(err.user_message(messages::NFC_READ_FAILED), EMPTY_TAG_MESSAGE);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_allows_rescan() {
        let (backend, service) = service();
        *backend.fail_lookup.lock().unwrap() = Some(HigiaError::Backend {
            status: 404,
            message: None,
        });
        let mut capture = Scripted(vec![
            Ok(CaptureOutcome::Code("NOPE".into())),
            Ok(CaptureOutcome::Code("SETOR-7".into())),
        ]);

        let err = service.identify(&mut capture).await.unwrap_err();
        assert_eq!(err.user_message(messages::LOOKUP_FAILED), messages::LOOKUP_FAILED);

        *backend.fail_lookup.lock().unwrap() = None;
        let workflow = service.identify(&mut capture).await.unwrap().unwrap();
        assert_eq!(workflow.sector_code(), "SETOR-7");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_and_start_enters_active() {
        let (backend, service) = service();
        let mut capture = Scripted(vec![Ok(CaptureOutcome::Code("SETOR-7".into()))]);

        let workflow = service.scan_and_start(&mut capture).await.unwrap().unwrap();

        assert!(workflow.is_active());
        assert_eq!(workflow.session().map(|s| s.id.as_str()), Some("s1"));
        assert_eq!(
            backend.calls(),
            vec![Call::FindSector("SETOR-7".into()), Call::Start("SETOR-7".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_and_start_failure_reports() {
        let (backend, service) = service();
        *backend.fail_start.lock().unwrap() = Some(HigiaError::Timeout);
        let mut capture = Scripted(vec![Ok(CaptureOutcome::Code("SETOR-7".into()))]);

        let err = service.scan_and_start(&mut capture).await.unwrap_err();
        assert_eq!(err.user_message(messages::START_FAILED), messages::START_FAILED);
    }

    #[tokio::test]
    async fn test_channel_capture_collapses_duplicate_reads() {
        let (tx, rx) = mpsc::channel(8);
        let mut capture = ChannelCapture::new(rx);

        for raw in ["SETOR-7", "SETOR-7\n", " SETOR-7", "SETOR-9"] {
            tx.send(raw.to_string()).await.unwrap();
        }
        drop(tx);

        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-9".into()));
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Cancelled);
    }

    fn text_record(text: &str) -> TagRead {
        let mut payload = vec![0x02, b'p', b't'];
        payload.extend_from_slice(text.as_bytes());
        TagRead::Payload(payload)
    }

    #[tokio::test]
    async fn test_tag_capture_decodes_and_collapses_taps() {
        let (tx, rx) = mpsc::channel(8);
        let mut capture = TagCapture::new(rx);

        for read in [text_record("SETOR-7"), text_record(" SETOR-7 "), text_record("UTI-1")] {
            tx.send(read).await.unwrap();
        }
        drop(tx);

        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("UTI-1".into()));
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_tag_capture_empty_tag() {
        let (tx, rx) = mpsc::channel(4);
        let mut capture = TagCapture::new(rx);
        tx.send(TagRead::Payload(Vec::new())).await.unwrap();
        tx.send(text_record("   ")).await.unwrap();

        for _ in 0..2 {
            let err = capture.capture().await.unwrap_err();
            assert_eq!(err.user_message(messages::NFC_READ_FAILED), EMPTY_TAG_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_tag_capture_reader_failure_allows_immediate_retap() {
        let (tx, rx) = mpsc::channel(4);
        let mut capture = TagCapture::new(rx);
        tx.send(text_record("SETOR-7")).await.unwrap();
        tx.send(TagRead::Failed("tag lost".into())).await.unwrap();
        tx.send(text_record("SETOR-7")).await.unwrap();

        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
        let err = capture.capture().await.unwrap_err();
        assert_eq!(err, HigiaError::Validation(messages::NFC_READ_FAILED.into()));
        // Within the debounce window, but the failure reset it.
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
    }

    #[tokio::test]
    async fn test_identify_from_tag() {
        let (backend, service) = service();
        let (tx, rx) = mpsc::channel(1);
        tx.send(text_record("SETOR-7")).await.unwrap();

        let workflow = service.identify(&mut TagCapture::new(rx)).await.unwrap().unwrap();

        assert_eq!(workflow.sector_code(), "SETOR-7");
        assert_eq!(backend.calls(), vec![Call::FindSector("SETOR-7".into())]);
    }

    #[tokio::test]
    async fn test_channel_capture_blank_read_resets_debounce() {
        let (tx, rx) = mpsc::channel(4);
        let mut capture = ChannelCapture::new(rx);
        for raw in ["SETOR-7", "", "SETOR-7"] {
            tx.send(raw.to_string()).await.unwrap();
        }

        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
        assert!(capture.capture().await.is_err());
        assert_eq!(capture.capture().await.unwrap(), CaptureOutcome::Code("SETOR-7".into()));
    }

    #[tokio::test]
    async fn test_channel_capture_rejects_blank_read() {
        let (tx, rx) = mpsc::channel(2);
        let mut capture = ChannelCapture::new(rx);
        tx.send("   ".to_string()).await.unwrap();

        let err = capture.capture().await.unwrap_err();
        assert_eq!(err, HigiaError::Validation(EMPTY_TAG_MESSAGE.into()));
    }
}
