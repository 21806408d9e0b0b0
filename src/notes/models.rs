//! Data models for clinical notes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encryption::EncryptedEnvelope;
use crate::roles::Role;

/// A therapy note whose body only exists at rest as an envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub author_id: Uuid,
    /// Encrypted body, bound to `id`
    pub envelope: EncryptedEnvelope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn can_write(&self) -> bool {
        self.role.can_write_clinical_notes()
    }

    pub fn can_read(&self, note: &TherapyNote) -> bool {
        match self.role {
            Role::Patient => note.patient_id == self.id,
            role => role.can_read_clinical_notes(),
        }
    }
}

/// Listing entry; carries no plaintext
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TherapyNote> for NoteSummary {
    fn from(note: &TherapyNote) -> Self {
        Self {
            id: note.id,
            patient_id: note.patient_id,
            author_id: note.author_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}
