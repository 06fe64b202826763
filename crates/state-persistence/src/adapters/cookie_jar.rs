//! # Cookie Jar
//!
//! Small-capacity, attribute-carrying key/value mechanism underneath the
//! backup tier. Entries carry an expiry and transport attributes; expired
//! entries read as absent.

use crate::domain::config::{PersistenceConfig, SameSite};
use crate::domain::errors::MechanismError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, TimeSource};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use std::sync::Arc;

/// Attributes attached to every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAttributes {
    pub max_age_secs: u64,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Only attached over a transport-secure connection.
    pub secure: bool,
    pub same_site: SameSite,
}

impl EntryAttributes {
    /// Attributes for backup entries under the given configuration.
    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self {
            max_age_secs: config.backup_max_age_secs,
            path: "/".to_string(),
            domain: None,
            secure: config.secure_attribute,
            same_site: config.same_site,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    value: String,
    attributes: EntryAttributes,
    expires_at: Timestamp,
}

/// Attribute-carrying mechanism over any `KeyValueStore`.
pub struct CookieJar<S: KeyValueStore> {
    store: S,
    time_source: Arc<dyn TimeSource>,
}

impl<S: KeyValueStore> CookieJar<S> {
    pub fn new(store: S, time_source: Arc<dyn TimeSource>) -> Self {
        Self { store, time_source }
    }

    fn entry(&self, name: &str, value: &str, attributes: &EntryAttributes) -> Result<Vec<u8>, MechanismError> {
        let expires_at = self
            .time_source
            .now()
            .saturating_add(attributes.max_age_secs.saturating_mul(1000));
        serde_json::to_vec(&StoredEntry {
            value: value.to_string(),
            attributes: attributes.clone(),
            expires_at,
        })
        .map_err(|e| MechanismError::CorruptEntry {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    fn decode(&self, name: &str, raw: &[u8]) -> Result<StoredEntry, MechanismError> {
        serde_json::from_slice(raw).map_err(|e| MechanismError::CorruptEntry {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Set one entry.
    pub fn set(&mut self, name: &str, value: &str, attributes: &EntryAttributes) -> Result<(), MechanismError> {
        let raw = self.entry(name, value, attributes)?;
        self.store.put(name.as_bytes(), &raw)
    }

    /// Set several entries atomically with shared attributes.
    pub fn set_all(&mut self, entries: &[(&str, &str)], attributes: &EntryAttributes) -> Result<(), MechanismError> {
        let operations = entries
            .iter()
            .map(|(name, value)| {
                self.entry(name, value, attributes)
                    .map(|raw| BatchOperation::put(name.as_bytes().to_vec(), raw))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.store.atomic_batch_write(operations)
    }

    /// Value of a live entry.
    pub fn get(&self, name: &str) -> Result<Option<String>, MechanismError> {
        let Some(raw) = self.store.get(name.as_bytes())? else {
            return Ok(None);
        };
        let entry = self.decode(name, &raw)?;
        if self.time_source.now() >= entry.expires_at {
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    /// Remove entries atomically; absent names are ignored.
    pub fn remove_all(&mut self, names: &[&str]) -> Result<(), MechanismError> {
        let operations = names
            .iter()
            .map(|name| BatchOperation::delete(name.as_bytes().to_vec()))
            .collect();
        self.store.atomic_batch_write(operations)
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&mut self) -> Result<usize, MechanismError> {
        let now = self.time_source.now();
        let expired: Vec<Vec<u8>> = self
            .store
            .prefix_scan(b"")?
            .into_iter()
            .filter(|(_, raw)| {
                serde_json::from_slice::<StoredEntry>(raw)
                    .map(|e| now >= e.expires_at)
                    .unwrap_or(false)
            })
            .map(|(k, _)| k)
            .collect();
        let count = expired.len();
        if count > 0 {
            self.store
                .atomic_batch_write(expired.into_iter().map(BatchOperation::delete).collect())?;
        }
        Ok(count)
    }

    /// Name plus value bytes of every live entry.
    pub fn size_bytes(&self) -> Result<u64, MechanismError> {
        let now = self.time_source.now();
        Ok(self
            .store
            .prefix_scan(b"")?
            .iter()
            .filter_map(|(k, raw)| {
                serde_json::from_slice::<StoredEntry>(raw)
                    .ok()
                    .filter(|e| now < e.expires_at)
                    .map(|e| (k.len() + e.value.len()) as u64)
            })
            .sum())
    }

    /// Write and remove a throwaway entry.
    pub fn probe(&mut self, name: &str, attributes: &EntryAttributes) -> Result<(), MechanismError> {
        self.set(name, "1", attributes)?;
        self.store.delete(name.as_bytes())
    }
}
