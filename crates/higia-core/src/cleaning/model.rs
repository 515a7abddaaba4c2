//! CleaningSession domain model.

use crate::sector::Sector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cleaning session record.
///
/// The client only ever holds what the backend returned: ids and timestamps
/// are never produced locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSession {
    pub id: String,
    #[serde(rename = "setorId", default, skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<String>,
    /// Embedded sector, present when the backend joins it in.
    #[serde(rename = "setor", default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(rename = "usuarioId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "inicioEm")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "fimEm", default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CleaningSession {
    /// A session is in progress until the backend stamps an end time.
    pub fn is_in_progress(&self) -> bool {
        self.finished_at.is_none()
    }

    pub fn sector_name(&self) -> Option<&str> {
        self.sector.as_ref().map(|s| s.name.as_str())
    }

    pub fn sector_location(&self) -> Option<&str> {
        self.sector.as_ref().and_then(|s| s.location.as_deref())
    }
}
