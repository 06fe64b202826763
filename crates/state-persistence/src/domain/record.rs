//! # Stored Records
//!
//! The native representations written to each tier.
//!
//! - `PrimaryDocument`: full state plus `_metadata`, written to the volatile
//!   and large-capacity tiers
//! - `BackupMetadata`: plaintext record stored next to the backup token

use serde::{Deserialize, Serialize};
use shared_types::{ApplicationState, LoadedState, ReconstructedState, Timestamp};

/// Storage mechanism label recorded in `_metadata`.
pub const HYBRID_MECHANISM: &str = "hybrid";

/// Classification label of backup entries.
pub const INTERNAL_CLASSIFICATION: &str = "internal";

/// Save metadata attached to the full document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetadata {
    pub saved_at: Timestamp,
    pub version: String,
    pub mechanism: String,
    /// Whether the stored document body is compressed. Documents are stored
    /// as plain structured text.
    #[serde(default)]
    pub compressed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub restored_from_backup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_at: Option<Timestamp>,
}

impl SaveMetadata {
    pub fn new(saved_at: Timestamp, version: impl Into<String>) -> Self {
        Self {
            saved_at,
            version: version.into(),
            mechanism: HYBRID_MECHANISM.to_string(),
            compressed: false,
            restored_from_backup: false,
            restored_at: None,
        }
    }

    /// Metadata for a reconstruction written back during self-repair.
    pub fn restored(restored_at: Timestamp, version: impl Into<String>) -> Self {
        Self {
            restored_from_backup: true,
            restored_at: Some(restored_at),
            ..Self::new(restored_at, version)
        }
    }
}

/// Full state with its `_metadata` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryDocument {
    #[serde(flatten)]
    pub state: ApplicationState,
    #[serde(rename = "_metadata")]
    pub metadata: SaveMetadata,
}

impl PrimaryDocument {
    pub fn new(state: ApplicationState, metadata: SaveMetadata) -> Self {
        Self { state, metadata }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Tag the state by provenance.
    pub fn into_loaded(self) -> LoadedState {
        if self.metadata.restored_from_backup {
            LoadedState::ReconstructedPartial(ReconstructedState {
                state: self.state,
                restored_at: self.metadata.restored_at.unwrap_or(self.metadata.saved_at),
            })
        } else {
            LoadedState::Full(self.state)
        }
    }
}

/// Plaintext metadata record stored next to the backup token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub encrypted: bool,
    pub signed: bool,
    pub compressed: bool,
    pub classification: String,
    pub created_at: Timestamp,
    pub last_accessed: Timestamp,
    pub access_count: u64,
}

impl BackupMetadata {
    /// Record for a freshly written token.
    pub fn created(now: Timestamp, compressed: bool) -> Self {
        Self {
            encrypted: true,
            signed: true,
            compressed,
            classification: INTERNAL_CLASSIFICATION.to_string(),
            created_at: now,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Record for an overwrite, keeping the creation time and access count.
    pub fn rewritten(&self, now: Timestamp, compressed: bool) -> Self {
        Self {
            compressed,
            last_accessed: now,
            ..self.clone()
        }
    }

    /// Record after a successful read.
    pub fn accessed(&self, now: Timestamp) -> Self {
        Self {
            last_accessed: now,
            access_count: self.access_count.saturating_add(1),
            ..self.clone()
        }
    }
}
