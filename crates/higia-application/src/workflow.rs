//! Session workflow: start or resume a cleaning session for one sector, keep
//! its elapsed time ticking, and close it with notes.
//!
//! ```text
//! Absent --start ok--> Active --finalize ok--> Finalized
//!   ^ start failed |     ^ finalize failed |
//!   +--------------+     +-----------------+
//! ```
//!
//! Backend failures never change state; the caller reports them and may try
//! again. The elapsed ticker exists only while the workflow is `Active`.

use higia_core::capture::normalize_code;
use higia_core::cleaning::{CleaningBackend, CleaningSession};
use higia_core::clock::Clock;
use higia_core::elapsed::{elapsed_seconds, format_elapsed};
use higia_core::sector::Sector;
use higia_core::{HigiaError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::messages;
use crate::timer::{DEFAULT_TICK_PERIOD, ElapsedTicker};

/// Where a workflow stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// No session yet; `start` creates one.
    Absent,
    /// A session is running.
    Active(CleaningSession),
    /// The session was closed; the caller should navigate away.
    Finalized(CleaningSession),
}

/// One sector's cleaning session as seen by a single screen.
pub struct SessionWorkflow {
    backend: Arc<dyn CleaningBackend>,
    clock: Arc<dyn Clock>,
    sector: Option<Sector>,
    sector_code: String,
    state: WorkflowState,
    elapsed: Arc<watch::Sender<u64>>,
    ticker: Option<ElapsedTicker>,
    tick_period: Duration,
}

impl SessionWorkflow {
    /// A workflow for a captured sector code, waiting for `start`.
    ///
    /// `sector` is the looked-up sector when the caller already has it.
    pub fn new(
        backend: Arc<dyn CleaningBackend>,
        clock: Arc<dyn Clock>,
        sector_code: &str,
        sector: Option<Sector>,
    ) -> Result<Self> {
        let sector_code =
            normalize_code(sector_code).map_err(|_| HigiaError::validation(messages::BLANK_CODE))?;

        Ok(Self {
            backend,
            clock,
            sector,
            sector_code,
            state: WorkflowState::Absent,
            elapsed: Arc::new(watch::channel(0).0),
            ticker: None,
            tick_period: DEFAULT_TICK_PERIOD,
        })
    }

    /// A workflow for a sector that was looked up by code.
    pub fn for_sector(
        backend: Arc<dyn CleaningBackend>,
        clock: Arc<dyn Clock>,
        sector: Sector,
    ) -> Result<Self> {
        let code = sector.code.clone();
        Self::new(backend, clock, &code, Some(sector))
    }

    /// Re-attaches to a session the backend reports as in progress.
    ///
    /// The workflow starts `Active` with its ticker running.
    pub fn resume(
        backend: Arc<dyn CleaningBackend>,
        clock: Arc<dyn Clock>,
        session: CleaningSession,
    ) -> Result<Self> {
        if !session.is_in_progress() {
            return Err(HigiaError::invalid_state(format!(
                "Higienização {} já foi finalizada",
                session.id
            )));
        }

        let sector = session.sector.clone();
        let sector_code = sector.as_ref().map(|s| s.code.clone()).unwrap_or_default();
        let mut workflow = Self {
            backend,
            clock,
            sector,
            sector_code,
            state: WorkflowState::Absent,
            elapsed: Arc::new(watch::channel(0).0),
            ticker: None,
            tick_period: DEFAULT_TICK_PERIOD,
        };
        workflow.enter_active(session)?;
        tracing::info!(session_id = %workflow.session_id().unwrap_or_default(), "Resumed cleaning session");
        Ok(workflow)
    }

    /// Changes how often elapsed time is republished. Takes effect the next
    /// time the workflow becomes `Active`.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Asks the backend to start a session for this workflow's sector code.
    ///
    /// On failure the workflow stays `Absent` and no timer runs; show the
    /// error with `messages::START_FAILED` as fallback.
    pub async fn start(&mut self) -> Result<&CleaningSession> {
        if !matches!(self.state, WorkflowState::Absent) {
            return Err(HigiaError::invalid_state(
                "Higienização já iniciada para este setor",
            ));
        }

        let session = match self.backend.start_session(&self.sector_code).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(sector_code = %self.sector_code, error = %err, "Failed to start cleaning session");
                return Err(err);
            }
        };

        tracing::info!(
            session_id = %session.id,
            sector_code = %self.sector_code,
            started_at = %session.started_at,
            "Cleaning session started"
        );
        self.enter_active(session)?;

        match &self.state {
            WorkflowState::Active(session) => Ok(session),
            _ => Err(HigiaError::internal("Workflow left Active while starting")),
        }
    }

    /// Closes the running session.
    ///
    /// `notes`, when given, must contain something other than whitespace;
    /// they are sent trimmed. Nothing is sent unless the workflow is `Active`
    /// and the notes pass that check. On success the ticker stops, the state
    /// becomes `Finalized` and the closed record is returned; on failure the
    /// session keeps running (show the error with `messages::FINALIZE_FAILED`
    /// as fallback).
    pub async fn finalize(&mut self, notes: Option<&str>) -> Result<CleaningSession> {
        let session_id = match &self.state {
            WorkflowState::Active(session) => session.id.clone(),
            WorkflowState::Absent => {
                return Err(HigiaError::invalid_state("Nenhuma higienização em andamento"));
            }
            WorkflowState::Finalized(_) => {
                return Err(HigiaError::invalid_state("Higienização já finalizada"));
            }
        };

        let notes = match notes {
            Some(text) if text.trim().is_empty() => {
                return Err(HigiaError::validation(messages::BLANK_NOTES));
            }
            Some(text) => Some(text.trim()),
            None => None,
        };

        let closed = match self.backend.finalize_session(&session_id, notes).await {
            Ok(closed) => closed,
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "Failed to finalize cleaning session");
                return Err(err);
            }
        };

        self.ticker = None;
        self.elapsed.send_replace(self.elapsed_at_close(&closed));
        self.state = WorkflowState::Finalized(closed.clone());
        tracing::info!(session_id = %session_id, "Cleaning session finalized");

        Ok(closed)
    }

    /// Tears the workflow down, stopping the ticker if one runs.
    pub fn close(mut self) {
        if self.ticker.take().is_some() {
            tracing::debug!(session_id = %self.session_id().unwrap_or_default(), "Workflow closed while session active");
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, WorkflowState::Active(_))
    }

    /// `true` once the session was closed and the screen should go away.
    pub fn should_navigate_away(&self) -> bool {
        matches!(self.state, WorkflowState::Finalized(_))
    }

    /// The running session, if any.
    pub fn session(&self) -> Option<&CleaningSession> {
        match &self.state {
            WorkflowState::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_id(&self) -> Option<String> {
        match &self.state {
            WorkflowState::Active(s) | WorkflowState::Finalized(s) => Some(s.id.clone()),
            WorkflowState::Absent => None,
        }
    }

    pub fn sector_code(&self) -> &str {
        &self.sector_code
    }

    /// Sector name, from the looked-up sector or the session record.
    pub fn title(&self) -> Option<&str> {
        self.sector
            .as_ref()
            .map(|s| s.name.as_str())
            .or_else(|| self.session().and_then(|s| s.sector_name()))
    }

    pub fn location(&self) -> Option<&str> {
        self.sector
            .as_ref()
            .and_then(|s| s.location.as_deref())
            .or_else(|| self.session().and_then(|s| s.sector_location()))
    }

    /// Seconds since the running session started, read from the clock now.
    pub fn elapsed_seconds(&self) -> Option<u64> {
        self.session()
            .map(|session| elapsed_seconds(session.started_at, self.clock.now()))
    }

    /// `HH:MM:SS` for the running session.
    pub fn elapsed_display(&self) -> Option<String> {
        self.elapsed_seconds().map(format_elapsed)
    }

    /// Receives the elapsed seconds each time the ticker fires.
    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn enter_active(&mut self, session: CleaningSession) -> Result<()> {
        let ticker = ElapsedTicker::spawn(
            session.started_at,
            self.clock.clone(),
            self.elapsed.clone(),
            self.tick_period,
        )?;
        self.ticker = Some(ticker);
        self.state = WorkflowState::Active(session);
        Ok(())
    }

    fn elapsed_at_close(&self, closed: &CleaningSession) -> u64 {
        let end = closed.finished_at.unwrap_or_else(|| self.clock.now());
        elapsed_seconds(closed.started_at, end)
    }
}

impl std::fmt::Debug for SessionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWorkflow")
            .field("sector_code", &self.sector_code)
            .field("state", &self.state)
            .field("ticking", &self.ticker.is_some())
            .finish()
    }
}
