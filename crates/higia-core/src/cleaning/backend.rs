//! Backend operations for sectors and cleaning sessions.

use async_trait::async_trait;

use super::model::CleaningSession;
use crate::error::Result;
use crate::sector::Sector;

/// The hygiene backend as seen by the session workflow.
///
/// Implementations attach the stored token to every call and clear the
/// token store when the backend answers 401, before returning
/// `HigiaError::Auth`.
#[async_trait]
pub trait CleaningBackend: Send + Sync {
    /// Looks a sector up by the code read from its QR label or NFC tag.
    async fn find_sector_by_code(&self, code: &str) -> Result<Sector>;

    /// Starts a session for the sector with the given code.
    async fn start_session(&self, sector_code: &str) -> Result<CleaningSession>;

    /// Closes a session. `notes = None` omits the field from the request.
    async fn finalize_session(&self, id: &str, notes: Option<&str>) -> Result<CleaningSession>;

    /// Sessions that are still running, across all users.
    async fn list_in_progress(&self) -> Result<Vec<CleaningSession>>;

    /// Past sessions visible to the current user.
    async fn list_history(&self) -> Result<Vec<CleaningSession>>;
}
