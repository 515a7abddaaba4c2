//! Sector domain model.

use serde::{Deserialize, Serialize};

/// A physical area that gets cleaned, identified by the code printed on its
/// QR label or written to its NFC tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "localizacao", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
