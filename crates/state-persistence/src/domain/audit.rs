//! # Audit Ring
//!
//! Bounded ring of audit records kept in the diagnostic tier. Oldest records
//! are dropped first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::Timestamp;
use std::collections::VecDeque;
use std::fmt;

/// Audit event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEvent {
    PersistenceInitialized,
    SaveState,
    LoadState,
    StateRestoredFromBackup,
    ClearState,
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditEvent::PersistenceInitialized => "PERSISTENCE_INITIALIZED",
            AuditEvent::SaveState => "SAVE_STATE",
            AuditEvent::LoadState => "LOAD_STATE",
            AuditEvent::StateRestoredFromBackup => "STATE_RESTORED_FROM_BACKUP",
            AuditEvent::ClearState => "CLEAR_STATE",
        };
        f.write_str(name)
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: Timestamp,
    pub event: AuditEvent,
    #[serde(default)]
    pub data: Value,
    pub session_id: String,
}

/// Bounded ring of audit records.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRing {
    capacity: usize,
    entries: VecDeque<AuditEntry>,
}

impl AuditRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild from stored records, keeping the newest `capacity`.
    pub fn from_entries(capacity: usize, entries: Vec<AuditEntry>) -> Self {
        let mut ring = Self::new(capacity);
        for entry in entries {
            ring.push(entry);
        }
        ring
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&mut self, entry: AuditEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<AuditEntry> {
        self.entries.into()
    }
}
