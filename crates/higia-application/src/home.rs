//! Session listings: the current user's running sessions and the history.

use higia_core::auth::TokenStore;
use higia_core::cleaning::{CleaningBackend, CleaningSession};
use higia_core::clock::Clock;
use higia_core::{HigiaError, Result};
use std::sync::Arc;

use crate::messages;
use crate::workflow::SessionWorkflow;

#[derive(Clone)]
pub struct HomeService {
    backend: Arc<dyn CleaningBackend>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl HomeService {
    pub fn new(
        backend: Arc<dyn CleaningBackend>,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
        }
    }

    /// In-progress sessions belonging to the stored user.
    ///
    /// The backend lists every running session; only those whose `usuarioId`
    /// matches the logged-in user are kept. Load failures use
    /// `messages::LOAD_FAILED` as fallback.
    pub async fn my_in_progress(&self) -> Result<Vec<CleaningSession>> {
        let user = self.store.user().await?.ok_or_else(|| HigiaError::Auth {
            message: Some(messages::NOT_LOGGED_IN.to_string()),
        })?;

        let sessions = self.backend.list_in_progress().await?;
        let total = sessions.len();
        let mine: Vec<_> = sessions
            .into_iter()
            .filter(|s| s.user_id.as_deref() == Some(user.id.as_str()))
            .collect();
        tracing::debug!(total, mine = mine.len(), "Loaded in-progress sessions");

        Ok(mine)
    }

    /// Closed and running sessions as the backend reports them.
    pub async fn history(&self) -> Result<Vec<CleaningSession>> {
        self.backend.list_history().await
    }

    /// Re-opens one of the user's running sessions as an `Active` workflow.
    pub async fn continue_session(&self, session_id: &str) -> Result<SessionWorkflow> {
        let session = self
            .my_in_progress()
            .await?
            .into_iter()
            .find(|s| s.id == session_id)
            .ok_or_else(|| {
                HigiaError::invalid_state(format!(
                    "Nenhuma higienização em andamento com id {session_id}"
                ))
            })?;

        SessionWorkflow::resume(self.backend.clone(), self.clock.clone(), session)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
